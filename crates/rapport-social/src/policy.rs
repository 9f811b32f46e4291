use rapport_shared::constants::MAX_MESSAGE_LEN;

/// Deployment knobs for the social core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialPolicy {
    /// When set, `send_message` fails with `NotFriends` unless the two users
    /// have an accepted friendship. Off by default.
    pub require_friendship_for_messaging: bool,

    /// Upper bound on message length, in characters.
    pub max_message_len: usize,
}

impl Default for SocialPolicy {
    fn default() -> Self {
        Self {
            require_friendship_for_messaging: false,
            max_message_len: MAX_MESSAGE_LEN,
        }
    }
}
