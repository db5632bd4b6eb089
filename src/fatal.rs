use std::{
    cell::Cell,
    fmt,
    io::{self, StderrLock, Write},
    panic::{self, AssertUnwindSafe},
    process::abort,
};

use crate::{
    arg::FatalArg,
    config::{self, ReporterConfig},
    template::render,
};

thread_local! {
    static REPORTING: Cell<bool> = const { Cell::new(false) };
}

/// Writes the configured prefix and the rendered `template` to standard
/// error, then aborts the process.
///
/// A malformed template does not stop termination: the raw template is
/// written followed by the reason it could not be rendered.
pub fn report_fatal(template: &str, args: &[FatalArg<'_>]) -> ! {
    enter();
    let config: &ReporterConfig = config::current();
    terminate_after(|stderr: &mut StderrLock<'_>| {
        if config.mirror_to_log {
            match render(template, args) {
                Ok(message) => log::error!(target: "fatal", "{}", message),
                Err(err) => log::error!(target: "fatal", "{} [malformed template: {}]", template, err),
            }
        }
        log::logger().flush();
        write_report(stderr, config, template, args)
    })
}

/// Like [`report_fatal`] for a message already captured by `format_args!`.
pub fn report_fatal_fmt(message: fmt::Arguments<'_>) -> ! {
    enter();
    let config: &ReporterConfig = config::current();
    terminate_after(|stderr: &mut StderrLock<'_>| {
        if config.mirror_to_log {
            log::error!(target: "fatal", "{}", message);
        }
        log::logger().flush();
        write_report_fmt(stderr, config, message)
    })
}

pub fn write_report<W: Write>(
    out: &mut W,
    config: &ReporterConfig,
    template: &str,
    args: &[FatalArg<'_>],
) -> io::Result<()> {
    match render(template, args) {
        Ok(message) => write_report_fmt(out, config, format_args!("{}", message)),
        Err(err) => write_report_fmt(
            out,
            config,
            format_args!("{} [malformed template: {}]", template, err),
        ),
    }
}

pub fn write_report_fmt<W: Write>(
    out: &mut W,
    config: &ReporterConfig,
    message: fmt::Arguments<'_>,
) -> io::Result<()> {
    out.write_all(config.prefix.as_bytes())?;
    out.write_fmt(message)?;
    if config.trailing_newline {
        out.write_all(b"\n")?;
    }
    Ok(())
}

// A second report on the same thread means formatting the first one failed
// fatally; there is nothing safe left to print.
fn enter() {
    if REPORTING.with(|reporting: &Cell<bool>| reporting.replace(true)) {
        abort();
    }
}

// The stderr lock is held until abort so that racing reporters cannot
// interleave their messages.
fn terminate_after<F>(report: F) -> !
where
    F: FnOnce(&mut StderrLock<'_>) -> io::Result<()>,
{
    let mut stderr: StderrLock<'static> = io::stderr().lock();
    let _ = panic::catch_unwind(AssertUnwindSafe(|| {
        let _ = report(&mut stderr);
        let _ = stderr.flush();
    }));
    abort()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written<F>(write: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut out: Vec<u8> = Vec::new();
        write(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn prefixes_rendered_message() {
        let config: ReporterConfig = ReporterConfig::default();
        assert_eq!(
            written(|out| write_report(out, &config, "value {} out of range", &[42.into()])),
            "assertion failed: value 42 out of range"
        );
    }

    #[test]
    fn literal_template_without_args() {
        let config: ReporterConfig = ReporterConfig::default();
        assert_eq!(
            written(|out| write_report(out, &config, "unreachable", &[])),
            "assertion failed: unreachable"
        );
    }

    #[test]
    fn malformed_template_is_written_raw() {
        let config: ReporterConfig = ReporterConfig::default();
        assert_eq!(
            written(|out| write_report(out, &config, "lost {} here", &[])),
            "assertion failed: lost {} here [malformed template: placeholder 0 has no argument (0 given)]"
        );
    }

    #[test]
    fn honours_prefix_and_newline() {
        let config: ReporterConfig = ReporterConfig::default()
            .with_prefix("core: ")
            .with_trailing_newline(true);
        assert_eq!(
            written(|out| write_report_fmt(out, &config, format_args!("{}-{}", 1, 2))),
            "core: 1-2\n"
        );
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn surfaces_write_failures_to_the_caller() {
        let config: ReporterConfig = ReporterConfig::default();
        let err: io::Error = write_report(&mut FailingWriter, &config, "x", &[]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
