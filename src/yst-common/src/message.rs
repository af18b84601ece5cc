//! A collection of macros for printing messages to the console with different styles.
#[macro_export]
macro_rules! success_message {
    ($($arg:tt)*) => {{
        use $crate::Colorize as _;
        println!("{} {}", "[SUCCESS]".green().bold(), format!($($arg)*));
    }};
}

#[macro_export]
macro_rules! error_message {
    ($($arg:tt)*) => {{
        use $crate::Colorize as _;
        eprintln!("{} {}", "  [ERROR]".red().bold(), format!($($arg)*));
    }};
}

#[macro_export]
macro_rules! warning_message {
    ($($arg:tt)*) => {{
        use $crate::Colorize as _;
        println!("{} {}", "[WARNING]".yellow().bold(), format!($($arg)*));
    }};
}

#[macro_export]
macro_rules! info_message {
    ($($arg:tt)*) => {{
        use $crate::Colorize as _;
        println!("{} {}", "   [INFO]".cyan().bold(), format!($($arg)*));
    }};
}
