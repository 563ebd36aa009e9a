/// Something that happened to a surface: a gesture, a bus notification,
/// a timer firing.
pub trait Intent: Send + 'static {}
