#[tokio::main]
async fn main() -> std::io::Result<()> {
    outreach_booking::run().await
}
