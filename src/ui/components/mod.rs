mod footer;
mod input;
mod key_result;
mod search_input;
mod tag_picker;

pub use footer::draw_footer;
pub use input::{InputResult, TextInput};
pub use key_result::KeyResult;
pub use search_input::{SearchEvent, SearchInput};
pub use tag_picker::{TagPicker, TagPickerEvent};
