// @generated by l4cdefgen. Do not edit.

#[allow(dead_code, missing_docs)]
pub mod net {
    pub const NAME: &str = "net";

    pub const UP_ID: usize = 0;
    pub const UP_SEVERITY: ::l4c::Severity = ::l4c::Severity::Info;
    pub const UP_NAME: &str = "NET_UP";
    pub const UP_FMT: &str = "link {} up";

    pub const DOWN_ID: usize = 1;
    pub const DOWN_SEVERITY: ::l4c::Severity = ::l4c::Severity::Error;
    pub const DOWN_NAME: &str = "NET_DOWN";
    pub const DOWN_FMT: &str = "link {} down: {}";

    pub const SCAN_ID: usize = 2;
    pub const SCAN_SEVERITY: ::l4c::Severity = ::l4c::Severity::Debug;
    pub const SCAN_NAME: &str = "NET_SCAN";
    pub const SCAN_FMT: &str = "scanning {}";
}

#[macro_export]
macro_rules! net_log {
    ($ctx:expr, $severity:expr, UP $(, $arg:expr)*) => {
        $ctx.emit($severity, 0, ::std::format_args!("link {} up" $(, $arg)*))
    };
    ($ctx:expr, $severity:expr, DOWN $(, $arg:expr)*) => {
        $ctx.emit($severity, 1, ::std::format_args!("link {} down: {}" $(, $arg)*))
    };
    ($ctx:expr, $severity:expr, SCAN $(, $arg:expr)*) => {
        $ctx.emit($severity, 2, ::std::format_args!("scanning {}" $(, $arg)*))
    };
}

#[macro_export]
macro_rules! net_log_with {
    ($ctx:expr, $style:expr, $severity:expr, UP $(, $arg:expr)*) => {
        $ctx.emit_with(&$style, $severity, 0, ::std::format_args!("link {} up" $(, $arg)*))
    };
    ($ctx:expr, $style:expr, $severity:expr, DOWN $(, $arg:expr)*) => {
        $ctx.emit_with(&$style, $severity, 1, ::std::format_args!("link {} down: {}" $(, $arg)*))
    };
    ($ctx:expr, $style:expr, $severity:expr, SCAN $(, $arg:expr)*) => {
        $ctx.emit_with(&$style, $severity, 2, ::std::format_args!("scanning {}" $(, $arg)*))
    };
}

#[macro_export]
macro_rules! net_start {
    ($ctx:expr, $severity:expr, UP $(, $arg:expr)*) => {
        $ctx.start($severity, 0, ::std::format_args!("link {} up" $(, $arg)*))
    };
    ($ctx:expr, $severity:expr, DOWN $(, $arg:expr)*) => {
        $ctx.start($severity, 1, ::std::format_args!("link {} down: {}" $(, $arg)*))
    };
    ($ctx:expr, $severity:expr, SCAN $(, $arg:expr)*) => {
        $ctx.start($severity, 2, ::std::format_args!("scanning {}" $(, $arg)*))
    };
}

#[macro_export]
macro_rules! net_do_at {
    ($ctx:expr, $severity:expr, UP, $f:expr) => {
        $ctx.do_at($severity, 0, $f)
    };
    ($ctx:expr, $severity:expr, DOWN, $f:expr) => {
        $ctx.do_at($severity, 1, $f)
    };
    ($ctx:expr, $severity:expr, SCAN, $f:expr) => {
        $ctx.do_at($severity, 2, $f)
    };
}

#[macro_export]
macro_rules! net_error {
    ($ctx:expr, UP $(, $arg:expr)*) => {
        $ctx.emit(::l4c::Severity::Error, 0, ::std::format_args!("link {} up" $(, $arg)*))
    };
    ($ctx:expr, DOWN $(, $arg:expr)*) => {
        $ctx.emit(::l4c::Severity::Error, 1, ::std::format_args!("link {} down: {}" $(, $arg)*))
    };
    ($ctx:expr, SCAN $(, $arg:expr)*) => {
        $ctx.emit(::l4c::Severity::Error, 2, ::std::format_args!("scanning {}" $(, $arg)*))
    };
}

#[macro_export]
macro_rules! net_warning {
    ($ctx:expr, UP $(, $arg:expr)*) => {
        $ctx.emit(::l4c::Severity::Warning, 0, ::std::format_args!("link {} up" $(, $arg)*))
    };
    ($ctx:expr, DOWN $(, $arg:expr)*) => {
        $ctx.emit(::l4c::Severity::Warning, 1, ::std::format_args!("link {} down: {}" $(, $arg)*))
    };
    ($ctx:expr, SCAN $(, $arg:expr)*) => {
        $ctx.emit(::l4c::Severity::Warning, 2, ::std::format_args!("scanning {}" $(, $arg)*))
    };
}

#[macro_export]
macro_rules! net_info {
    ($ctx:expr, UP $(, $arg:expr)*) => {
        $ctx.emit(::l4c::Severity::Info, 0, ::std::format_args!("link {} up" $(, $arg)*))
    };
    ($ctx:expr, DOWN $(, $arg:expr)*) => {
        $ctx.emit(::l4c::Severity::Info, 1, ::std::format_args!("link {} down: {}" $(, $arg)*))
    };
    ($ctx:expr, SCAN $(, $arg:expr)*) => {
        $ctx.emit(::l4c::Severity::Info, 2, ::std::format_args!("scanning {}" $(, $arg)*))
    };
}

#[macro_export]
macro_rules! net_debug {
    ($ctx:expr, UP $(, $arg:expr)*) => {
        $ctx.emit(::l4c::Severity::Debug, 0, ::std::format_args!("link {} up" $(, $arg)*))
    };
    ($ctx:expr, DOWN $(, $arg:expr)*) => {
        $ctx.emit(::l4c::Severity::Debug, 1, ::std::format_args!("link {} down: {}" $(, $arg)*))
    };
    ($ctx:expr, SCAN $(, $arg:expr)*) => {
        $ctx.emit(::l4c::Severity::Debug, 2, ::std::format_args!("scanning {}" $(, $arg)*))
    };
}

#[allow(dead_code, missing_docs)]
pub mod disk {
    pub const NAME: &str = "disk";

    pub const FULL_ID: usize = 3;
    pub const FULL_SEVERITY: ::l4c::Severity = ::l4c::Severity::Warning;
    pub const FULL_NAME: &str = "DISK_FULL";
    pub const FULL_FMT: &str = "{} is {}% full";
}

#[macro_export]
macro_rules! disk_log {
    ($ctx:expr, $severity:expr, FULL $(, $arg:expr)*) => {
        $ctx.emit($severity, 3, ::std::format_args!("{} is {}% full" $(, $arg)*))
    };
}

#[macro_export]
macro_rules! disk_log_with {
    ($ctx:expr, $style:expr, $severity:expr, FULL $(, $arg:expr)*) => {
        $ctx.emit_with(&$style, $severity, 3, ::std::format_args!("{} is {}% full" $(, $arg)*))
    };
}

#[macro_export]
macro_rules! disk_start {
    ($ctx:expr, $severity:expr, FULL $(, $arg:expr)*) => {
        $ctx.start($severity, 3, ::std::format_args!("{} is {}% full" $(, $arg)*))
    };
}

#[macro_export]
macro_rules! disk_do_at {
    ($ctx:expr, $severity:expr, FULL, $f:expr) => {
        $ctx.do_at($severity, 3, $f)
    };
}

#[macro_export]
macro_rules! disk_error {
    ($ctx:expr, FULL $(, $arg:expr)*) => {
        $ctx.emit(::l4c::Severity::Error, 3, ::std::format_args!("{} is {}% full" $(, $arg)*))
    };
}

#[macro_export]
macro_rules! disk_warning {
    ($ctx:expr, FULL $(, $arg:expr)*) => {
        $ctx.emit(::l4c::Severity::Warning, 3, ::std::format_args!("{} is {}% full" $(, $arg)*))
    };
}

#[macro_export]
macro_rules! disk_info {
    ($ctx:expr, FULL $(, $arg:expr)*) => {
        $ctx.emit(::l4c::Severity::Info, 3, ::std::format_args!("{} is {}% full" $(, $arg)*))
    };
}

#[macro_export]
macro_rules! disk_debug {
    ($ctx:expr, FULL $(, $arg:expr)*) => {
        $ctx.emit(::l4c::Severity::Debug, 3, ::std::format_args!("{} is {}% full" $(, $arg)*))
    };
}
