mod member_detail;
mod member_list;

pub use member_detail::MemberDetailView;
pub use member_list::MemberListView;
