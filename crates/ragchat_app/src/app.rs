use std::borrow::Cow;
use std::io::{self, BufRead, Write};

use anyhow::Context;
use chat_logging::{chat_info, chat_warn};
use ragchat_engine::{ChatSession, ReqwestDispatcher};

use crate::cli::CliArgs;
use crate::config;
use crate::logging;
use crate::ui::TerminalSink;

const QUIT_COMMANDS: [&str; 2] = ["/quit", "/exit"];

pub fn run(args: CliArgs) -> anyhow::Result<()> {
    let config_path = args.resolve_config_path();
    let mut config = config::load(&config_path)
        .with_context(|| format!("loading configuration from {config_path:?}"))?;
    args.apply(&mut config);

    logging::initialize(config.log, args.log_level());
    chat_info!("Application starting up (base_url={})", config.base_url);

    let dispatch = config.dispatch_settings()?;
    let base_url = dispatch.base_url.clone();
    let dispatcher = ReqwestDispatcher::new(dispatch).context("building HTTP client")?;
    let mut session = ChatSession::new(
        config.chat_settings(),
        dispatcher,
        TerminalSink::new(base_url),
    );

    // One turn at a time; the session awaits the whole job before reading more input.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;

    let mut input = io::stdin().lock();
    loop {
        prompt()?;
        let Some(line) = read_line(&mut input).context("reading input")? else {
            break;
        };
        if QUIT_COMMANDS.contains(&line.trim()) {
            break;
        }
        runtime.block_on(session.submit(&line));
        if session.state().busy().is_some() {
            chat_warn!("Turn ended with the busy indicator still shown");
        }
    }

    chat_info!(
        "Application shutting down after {} messages",
        session.state().transcript().len()
    );
    Ok(())
}

/// Next input line without its terminator, or `None` at end of input.
///
/// Invalid UTF-8 is replaced rather than rejected.
fn read_line(input: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut buf = Vec::new();
    if input.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }
    if buf.ends_with(b"\n") {
        buf.pop();
        if buf.ends_with(b"\r") {
            buf.pop();
        }
    }
    let line = String::from_utf8_lossy(&buf);
    if let Cow::Owned(_) = line {
        chat_warn!("Input line was not valid UTF-8; invalid bytes replaced");
    }
    Ok(Some(line.into_owned()))
}

fn prompt() -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    write!(out, "> ").context("writing prompt")?;
    out.flush().context("flushing prompt")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::read_line;
    use std::io::Cursor;

    #[test]
    fn invalid_utf8_line_does_not_end_input() {
        let mut input = Cursor::new(b"caf\xe9 nearby\r\nsecond\n".to_vec());
        assert_eq!(
            read_line(&mut input).unwrap().as_deref(),
            Some("caf\u{fffd} nearby")
        );
        assert_eq!(read_line(&mut input).unwrap().as_deref(), Some("second"));
        assert_eq!(read_line(&mut input).unwrap(), None);
    }

    #[test]
    fn last_line_without_newline_is_read() {
        let mut input = Cursor::new(b"quiet cafe".to_vec());
        assert_eq!(read_line(&mut input).unwrap().as_deref(), Some("quiet cafe"));
        assert_eq!(read_line(&mut input).unwrap(), None);
    }
}
