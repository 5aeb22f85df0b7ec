use bollard::container::LogOutput;
use dockformer_runtime::{LogLine, LogStreamType};

/// Convert one frame of daemon output into a log line.
///
/// Console and stdin frames are reported as stdout.
pub fn parse_log_output(output: LogOutput) -> LogLine {
    let (stream, message) = match output {
        LogOutput::StdOut { message } => (LogStreamType::Stdout, message),
        LogOutput::StdErr { message } => (LogStreamType::Stderr, message),
        LogOutput::Console { message } => (LogStreamType::Stdout, message),
        LogOutput::StdIn { message } => (LogStreamType::Stdout, message),
    };

    LogLine {
        stream,
        message: String::from_utf8_lossy(&message).trim_end().to_string(),
    }
}
