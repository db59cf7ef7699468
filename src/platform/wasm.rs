use std::sync::Once;

static LOGGER_INIT: Once = Once::new();
static PANIC_HOOK: Once = Once::new();

pub fn init_logging(level: log::Level) {
    LOGGER_INIT.call_once(|| {
        wasm_logger::init(wasm_logger::Config::new(level));
    });
}

pub fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));
    });
}
