//! Command-line argument parsing and processing.
//!
//! This module handles parsing of command-line arguments and provides a clean
//! interface for the main application logic. It supports the standard help,
//! version, and debug flags while gracefully handling unknown options.

use crate::logger::Log;

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the normal application with these settings
    Run { debug_enabled: bool },
    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to unknown arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// # Arguments
    /// * `args` - Iterator over command-line arguments (typically from std::env::args())
    ///
    /// # Returns
    /// ParsedArgs containing the determined action
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut debug_enabled = false;
        let mut display_help = false;
        let mut display_version = false;
        let mut unknown_arg_found = false;

        for arg in args.into_iter().skip(1) {
            match arg.as_ref() {
                "--help" | "-h" => display_help = true,
                "--version" | "-V" | "-v" => display_version = true,
                "--debug" | "-d" => debug_enabled = true,
                other => {
                    // Check if the argument starts with a dash, indicating it's an option
                    if other.starts_with('-') {
                        Log::log_warning(&format!("Unknown option: {}", other));
                        unknown_arg_found = true;
                    }
                    // Non-option arguments are currently ignored
                }
            }
        }

        let action = if display_version {
            CliAction::ShowVersion
        } else if unknown_arg_found {
            CliAction::ShowHelpDueToError
        } else if display_help {
            CliAction::ShowHelp
        } else {
            CliAction::Run { debug_enabled }
        };

        ParsedArgs { action }
    }

    /// Convenience method to parse from std::env::args()
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    Log::log_version();
    Log::log_pipe();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    Log::log_version();
    Log::log_block_start(env!("CARGO_PKG_DESCRIPTION"));
    Log::log_block_start("Usage: brightr [OPTIONS]");
    Log::log_block_start("Options:");
    Log::log_indented("-d, --debug    Enable detailed debug output");
    Log::log_indented("-h, --help     Print help information");
    Log::log_indented("-V, --version  Print version information");
    Log::log_block_start("Signals:");
    Log::log_indented("SIGUSR1        Step brightness up");
    Log::log_indented("SIGUSR2        Step brightness down");
    Log::log_end();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_no_args() {
        let args = vec!["brightr"];
        let parsed = ParsedArgs::parse(args);
        assert_eq!(
            parsed.action,
            CliAction::Run {
                debug_enabled: false
            }
        );
    }

    #[test]
    fn test_parse_debug_flags() {
        for flag in ["--debug", "-d"] {
            let parsed = ParsedArgs::parse(vec!["brightr", flag]);
            assert_eq!(
                parsed.action,
                CliAction::Run {
                    debug_enabled: true
                }
            );
        }
    }

    #[test]
    fn test_parse_help_flags() {
        for flag in ["--help", "-h"] {
            let parsed = ParsedArgs::parse(vec!["brightr", flag]);
            assert_eq!(parsed.action, CliAction::ShowHelp);
        }
    }

    #[test]
    fn test_parse_version_flags() {
        for flag in ["--version", "-V", "-v"] {
            let parsed = ParsedArgs::parse(vec!["brightr", flag]);
            assert_eq!(parsed.action, CliAction::ShowVersion);
        }
    }

    #[test]
    fn test_parse_unknown_flag() {
        // Silence the warning this parse emits
        Log::set_enabled(false);
        let parsed = ParsedArgs::parse(vec!["brightr", "--unknown"]);
        Log::set_enabled(true);
        assert_eq!(parsed.action, CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_version_takes_precedence() {
        let parsed = ParsedArgs::parse(vec!["brightr", "--version", "--help", "--debug"]);
        assert_eq!(parsed.action, CliAction::ShowVersion);
    }

    #[test]
    fn test_unknown_beats_help() {
        Log::set_enabled(false);
        let parsed = ParsedArgs::parse(vec!["brightr", "--help", "--bogus"]);
        Log::set_enabled(true);
        assert_eq!(parsed.action, CliAction::ShowHelpDueToError);
    }
}
