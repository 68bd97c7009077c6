use crate::{
    window_host::WindowHost,
    window_registry::WindowRegistry,
    window_types::{WindowDescriptor, WindowId, WindowModule},
};

pub const SETTINGS_WINDOW: &str = "settings";
pub const HELLO_WORLD_WINDOW: &str = "hello-world";
pub const HELLO_STYLING_WINDOW: &str = "hello-styling";
pub const HELLO_TRPC_WINDOW: &str = "hello-trpc";

const PRODUCT_NAME: &str = "SparkPilot";
const DEFAULT_WIDTH: u32 = 1280;
const DEFAULT_HEIGHT: u32 = 720;

fn standard_descriptor(id: &str, menu_label: &str) -> WindowDescriptor {
    WindowDescriptor {
        id: WindowId::from(id),
        title: format!("{PRODUCT_NAME} • {menu_label}"),
        menu_label: menu_label.to_string(),
        single_instance: true,
        width: DEFAULT_WIDTH,
        height: DEFAULT_HEIGHT,
        min_width: Some(DEFAULT_WIDTH),
        min_height: Some(DEFAULT_HEIGHT),
        route: None,
    }
}

pub fn builtin_descriptors() -> Vec<WindowDescriptor> {
    vec![
        standard_descriptor(SETTINGS_WINDOW, "Settings"),
        standard_descriptor(HELLO_WORLD_WINDOW, "Hello World"),
        standard_descriptor(HELLO_STYLING_WINDOW, "Hello Styling"),
        standard_descriptor(HELLO_TRPC_WINDOW, "Hello TRPC"),
    ]
}

pub fn register_builtin_windows<H: WindowHost>(registry: &WindowRegistry<H>) {
    for descriptor in builtin_descriptors() {
        registry.register(WindowModule::new(descriptor));
    }
}
