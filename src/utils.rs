#[macro_export]
macro_rules! log {
    ( $( $t:tt )* ) => {
        web_sys::console::log_1(&format!( $( $t )* ).into());
    }
}


#[macro_export]
macro_rules! log_warn {
    ( $( $t:tt )* ) => {
        web_sys::console::warn_1(&format!( $( $t )* ).into());
    }
}


/// Enable better error messages if our code ever panics
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}


/// Check if a float is zero
#[cfg(test)]
#[inline(always)]
pub fn is_float_zero(x: f32, threshold: f32) -> bool {
    x.abs() < threshold
}


/// Check if two floats are equal
#[cfg(test)]
#[inline(always)]
pub fn are_floats_equal(x: f32, y: f32, threshold: f32) -> bool {
    is_float_zero(x - y, threshold)
}
