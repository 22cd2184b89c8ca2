//! 浏览器控制台输出与 panic hook。

#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
pub fn set_panic_hook() {}

#[cfg(target_arch = "wasm32")]
pub fn log(message: &str) {
    web_sys::console::log_1(&message.into());
}

#[cfg(target_arch = "wasm32")]
pub fn error(message: &str) {
    web_sys::console::error_1(&message.into());
}

// 非 wasm 目标（原生单元测试）上无法调用 JS 控制台
#[cfg(not(target_arch = "wasm32"))]
pub fn log(message: &str) {
    tracing::info!(target: "console", "{message}");
}

#[cfg(not(target_arch = "wasm32"))]
pub fn error(message: &str) {
    tracing::error!(target: "console", "{message}");
}
