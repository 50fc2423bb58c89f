/// Creates a single [`ChatMessage`](crate::ChatMessage) from a role shorthand.
///
/// Tool responses carry the id and name of the call they answer.
///
/// ```rust
/// use tether::{Role, tether_msg};
///
/// let message = tether_msg!(assistant => "Done.");
/// assert_eq!(message.role, Role::Assistant);
/// assert_eq!(message.content, "Done.");
///
/// let message = tether_msg!(tool("call_1", "add") => "3");
/// assert_eq!(message.tool_call_id.as_deref(), Some("call_1"));
/// ```
#[macro_export]
macro_rules! tether_msg {
    (system => $content:expr $(,)?) => {
        $crate::ChatMessage::system($content)
    };
    (user => $content:expr $(,)?) => {
        $crate::ChatMessage::user($content)
    };
    (assistant => $content:expr $(,)?) => {
        $crate::ChatMessage::assistant($content)
    };
    (tool($call_id:expr, $name:expr) => $content:expr $(,)?) => {
        $crate::ChatMessage::tool($call_id, $name, $content)
    };
    ($role:ident => $content:expr $(,)?) => {
        compile_error!("unsupported role: use system, user, assistant, or tool(call_id, name)");
    };
}

/// Creates a `Vec<ChatMessage>` from role/content pairs.
///
/// ```rust
/// use tether::{Role, tether_messages};
///
/// let messages = tether_messages![
///     system => "You are concise.",
///     user => "What is 1 + 2?",
/// ];
///
/// assert_eq!(messages.len(), 2);
/// assert_eq!(messages[0].role, Role::System);
/// assert_eq!(messages[1].role, Role::User);
/// ```
#[macro_export]
macro_rules! tether_messages {
    () => {
        Vec::<$crate::ChatMessage>::new()
    };
    ($($role:ident => $content:expr),+ $(,)?) => {
        vec![$($crate::tether_msg!($role => $content)),+]
    };
}
