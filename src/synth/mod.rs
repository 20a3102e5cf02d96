// Purpose: note programs that run as scheduler tasks, plus driver control
// This layer sits above the engine and the DSP primitives

pub mod melody;
pub mod message;
pub mod note;

pub use melody::Melody;
pub use message::{apply_messages, ControlMessage, MessageReceiver};
pub use note::{PlayNote, SineVoice};
