use crate::draft::Draft;
use anyhow::{Context, Result};
use std::process::{Command, Stdio};

/// Percent-encodes everything except the RFC 3986 unreserved set and
/// `!*'()`, matching JavaScript's `encodeURIComponent`.
pub fn encode_uri_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(b as char),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

pub fn mailto_uri(recipient: &str, subject: &str, body: &str) -> String {
    format!(
        "mailto:{}?subject={}&body={}",
        recipient,
        encode_uri_component(subject),
        encode_uri_component(body)
    )
}

/// Hands a finished draft to whatever sends mail. No delivery confirmation.
pub trait MailComposer {
    fn compose(&self, recipient: &str, draft: &Draft) -> Result<()>;
}

/// Opens the `mailto:` URI with the platform's default handler.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemMailComposer;

impl MailComposer for SystemMailComposer {
    fn compose(&self, recipient: &str, draft: &Draft) -> Result<()> {
        let uri = mailto_uri(recipient, &draft.subject, &draft.body);
        launch(opener_command(std::env::consts::OS, &uri))
            .with_context(|| format!("failed to launch mail handler for {}", recipient))?;
        tracing::info!(%recipient, "mail client launched");
        Ok(())
    }
}

/// Starts the opener and reaps it on a background thread.
fn launch(mut cmd: Command) -> Result<()> {
    let program = cmd.get_program().to_string_lossy().to_string();
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to run {}", program))?;
    std::thread::spawn(move || match child.wait() {
        Ok(status) if !status.success() => {
            tracing::warn!(%program, %status, "mail handler exited with failure");
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(%program, error = %e, "failed to wait for mail handler"),
    });
    Ok(())
}

/// The URI is always passed as a single argv entry, never through a shell.
fn opener_command(os: &str, uri: &str) -> Command {
    let mut c = match os {
        "macos" => Command::new("open"),
        "windows" => {
            let mut c = Command::new("rundll32");
            c.arg("url.dll,FileProtocolHandler");
            c
        }
        _ => Command::new("xdg-open"),
    };
    c.arg(uri);
    c
}
