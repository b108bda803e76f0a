//! Command-level tests

mod test_chat_shell;
mod test_page_tools;
