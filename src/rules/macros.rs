#[macro_export]
macro_rules! report {
    ($ctx:expr, $line:expr, $column:expr) => {
        $ctx.report_line_error($line, $column, None)
    };
    ($ctx:expr, $line:expr, $column:expr, $($msg:tt)+) => {
        $ctx.report_line_error($line, $column, Some(format!($($msg)+)))
    };
}
