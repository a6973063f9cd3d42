pub use log::debug;

/// Print log message for either of two debug scenarios:
/// (1) The global debug log level has been activated
/// (2) A local debug flag has been enabled, such as a per-reader trace flag
///
/// The local debug flag is given as the first argument, and determines whether the debug message
/// is directly printed to stderr.
///
/// # Examples
///
/// ```ignore
/// debug_msg!(false, "Stepping through {chrom}"); // debug log msg only if the global --debug flag is given
/// debug_msg!(self.trace, "Stepping through {chrom}"); // printed directly to stderr when tracing this reader
/// ```
macro_rules! debug_msg {
    ($flag:expr, $($arg:tt)+) => {
        if $flag {
            eprintln!($($arg)+);
        } else {
            $crate::log_utils::debug!($($arg)+);
        }
    }
}

pub(crate) use debug_msg;
