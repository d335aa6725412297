//! Process-wide panic reporting

use std::any::Any;

use super::{Item, Level, Telemetry};

/// Report every panic in the process as a critical item, then run the
/// previously installed hook.
pub fn install_panic_hook(telemetry: Telemetry) {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let mut item = Item::new(Level::Critical, panic_message(info.payload()));
        if let Some(location) = info.location() {
            item = item.with_extra(
                "location",
                format!("{}:{}:{}", location.file(), location.line(), location.column()),
            );
        }
        if let Some(name) = std::thread::current().name() {
            item = item.with_extra("thread", name);
        }

        telemetry.report(item);
        previous(info);
    }));
}

/// Best-effort text of a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_variants() {
        let payload: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(payload.as_ref()), "static message");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(panic_message(payload.as_ref()), "owned message");

        let payload: Box<dyn Any + Send> = Box::new(42_u32);
        assert_eq!(panic_message(payload.as_ref()), "panic with non-string payload");
    }
}
