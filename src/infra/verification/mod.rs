pub mod recaptcha_verifier;
