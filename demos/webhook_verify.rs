//! Demonstrates signing a webhook body the way the provider does and checking it with
//! [`WebhookVerifier`], including a tampered body that must be rejected.

// crates.io
use color_eyre::Result;
// self
use verification_broker::{
	error::Error,
	webhook::{SIGNATURE_HEADER, WebhookVerifier, compute_signature},
};

fn main() -> Result<()> {
	color_eyre::install()?;

	let secret = "demo-secret";
	let verifier = WebhookVerifier::new(secret);
	let body = br#"{"event_type":"task-status-updated","status":"done"}"#;
	let signature = compute_signature(body, secret.as_bytes())?;

	println!("{SIGNATURE_HEADER}: {signature}.");

	let summary = verifier.authenticate(body, Some(&signature))?;

	println!("Accepted {:?} with status {:?}.", summary.event_type, summary.status);

	let tampered = br#"{"event_type":"task-status-updated","status":"error"}"#;

	match verifier.authenticate(tampered, Some(&signature)) {
		Err(Error::InvalidSignature) => println!("Tampered body rejected."),
		other => println!("Unexpected outcome for tampered body: {other:?}."),
	}

	Ok(())
}
