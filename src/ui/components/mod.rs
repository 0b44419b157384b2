mod input;
mod key_result;
mod member_form;
mod role_picker;
mod search_input;

pub use input::{InputResult, TextInput};
pub use key_result::KeyResult;
pub use member_form::{FormEvent, MemberForm};
pub use role_picker::{RolePicker, RolePickerEvent};
pub use search_input::{SearchEvent, SearchInput};
