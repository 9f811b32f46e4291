//! Direct-message log.

use std::sync::Arc;

use rapport_shared::{
    Dyad, Message, MessageId, MessageStore, RapportError, RelationshipStore, Result, UserId,
};
use tracing::info;

use crate::clock::MonotonicClock;
use crate::policy::SocialPolicy;

pub struct ConversationLog {
    messages: Arc<dyn MessageStore>,
    friendships: Arc<dyn RelationshipStore>,
    policy: SocialPolicy,
    clock: MonotonicClock,
}

impl ConversationLog {
    /// Build a log over `messages`. The clock is seeded from the newest
    /// stored message so timestamps keep increasing across restarts.
    ///
    /// One log should own all writes to a given store; two logs appending
    /// concurrently each keep their own order but not a shared one.
    pub fn open(
        messages: Arc<dyn MessageStore>,
        friendships: Arc<dyn RelationshipStore>,
        policy: SocialPolicy,
    ) -> Result<Self> {
        let clock = match messages.latest_timestamp()? {
            Some(latest) => MonotonicClock::starting_at(latest),
            None => MonotonicClock::new(),
        };

        Ok(Self {
            messages,
            friendships,
            policy,
            clock,
        })
    }

    pub fn policy(&self) -> &SocialPolicy {
        &self.policy
    }

    /// Append a message and return it with its assigned id and timestamp.
    pub fn send_message(&self, sender: &UserId, receiver: &UserId, text: &str) -> Result<Message> {
        if text.trim().is_empty() {
            return Err(RapportError::InvalidArgument(
                "message text must not be empty".into(),
            ));
        }
        let len = text.chars().count();
        if len > self.policy.max_message_len {
            return Err(RapportError::InvalidArgument(format!(
                "message is {len} characters, limit is {}",
                self.policy.max_message_len
            )));
        }
        if self.policy.require_friendship_for_messaging
            && !self.friendships.are_friends(sender, receiver)?
        {
            return Err(RapportError::NotFriends {
                sender: *sender,
                receiver: *receiver,
            });
        }

        // Stamping and appending under the clock lock keeps insertion order
        // and creation time in agreement across concurrent senders.
        let message = self.clock.stamp(|created_at| {
            let message = Message {
                id: MessageId::new(),
                sender_id: *sender,
                receiver_id: *receiver,
                text: text.to_string(),
                created_at,
            };
            self.messages.append_message(&message)?;
            Ok::<_, RapportError>(message)
        })?;

        info!(
            id = %message.id,
            sender = %sender,
            receiver = %receiver,
            len,
            "message stored"
        );
        Ok(message)
    }

    /// Every message between `a` and `b`, oldest first. The argument order
    /// does not matter; an empty vector means they never talked.
    pub fn get_conversation(&self, a: &UserId, b: &UserId) -> Result<Vec<Message>> {
        self.messages.conversation(&Dyad::new(*a, *b))
    }
}

#[cfg(test)]
mod tests {
    use rapport_store::StoreHandle;

    use super::*;
    use crate::graph::RelationshipGraph;
    use crate::testing::{register, store};

    fn log_with(store: &StoreHandle, policy: SocialPolicy) -> ConversationLog {
        let shared = Arc::new(store.clone());
        ConversationLog::open(shared.clone(), shared, policy).unwrap()
    }

    fn texts(messages: &[Message]) -> Vec<&str> {
        messages.iter().map(|m| m.text.as_str()).collect()
    }

    #[test]
    fn hello_hi_scenario() {
        let store = store();
        let log = log_with(&store, SocialPolicy::default());
        let (u1, u2) = (UserId::new(), UserId::new());

        log.send_message(&u1, &u2, "hello").unwrap();
        log.send_message(&u2, &u1, "hi").unwrap();

        let convo = log.get_conversation(&u1, &u2).unwrap();
        assert_eq!(texts(&convo), vec!["hello", "hi"]);
        assert_eq!(convo, log.get_conversation(&u2, &u1).unwrap());
    }

    #[test]
    fn returned_message_matches_stored_one() {
        let store = store();
        let log = log_with(&store, SocialPolicy::default());
        let (a, b) = (UserId::new(), UserId::new());

        let sent = log.send_message(&a, &b, "persist me").unwrap();
        assert_eq!(sent.sender_id, a);
        assert_eq!(sent.receiver_id, b);
        assert_eq!(log.get_conversation(&a, &b).unwrap(), vec![sent]);
    }

    #[test]
    fn timestamps_are_non_decreasing() {
        let store = store();
        let log = log_with(&store, SocialPolicy::default());
        let (a, b) = (UserId::new(), UserId::new());

        let sent: Vec<_> = (0..20)
            .map(|i| log.send_message(&a, &b, &format!("m{i}")).unwrap())
            .collect();
        for pair in sent.windows(2) {
            assert!(pair[0].created_at <= pair[1].created_at);
        }

        let fetched = log.get_conversation(&b, &a).unwrap();
        assert_eq!(fetched, sent);
    }

    #[test]
    fn concurrent_senders_store_rows_in_timestamp_order() {
        let store = store();
        let log = Arc::new(log_with(&store, SocialPolicy::default()));
        let (a, b) = (UserId::new(), UserId::new());

        let workers: Vec<_> = (0..8)
            .map(|w| {
                let log = log.clone();
                std::thread::spawn(move || {
                    for i in 0..200 {
                        let (from, to) = if i % 2 == 0 { (a, b) } else { (b, a) };
                        log.send_message(&from, &to, &format!("w{w} m{i}")).unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let stamps: Vec<String> = store
            .with(|db| {
                let mut stmt = db
                    .conn()
                    .prepare("SELECT created_at FROM messages ORDER BY seq ASC")?;
                let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
                let mut stamps = Vec::new();
                for row in rows {
                    stamps.push(row?);
                }
                Ok(stamps)
            })
            .unwrap();

        assert_eq!(stamps.len(), 8 * 200);
        let inversions = stamps.windows(2).filter(|p| p[0] > p[1]).count();
        assert_eq!(inversions, 0);
    }

    #[test]
    fn empty_text_is_invalid() {
        let store = store();
        let log = log_with(&store, SocialPolicy::default());
        let (a, b) = (UserId::new(), UserId::new());

        for text in ["", "   ", "\n\t"] {
            assert!(matches!(
                log.send_message(&a, &b, text),
                Err(RapportError::InvalidArgument(_))
            ));
        }
        assert!(log.get_conversation(&a, &b).unwrap().is_empty());
    }

    #[test]
    fn oversized_text_is_invalid() {
        let store = store();
        let policy = SocialPolicy {
            max_message_len: 5,
            ..SocialPolicy::default()
        };
        let log = log_with(&store, policy);
        let (a, b) = (UserId::new(), UserId::new());

        assert!(log.send_message(&a, &b, "héllo").is_ok());
        assert!(matches!(
            log.send_message(&a, &b, "héllo!"),
            Err(RapportError::InvalidArgument(_))
        ));
    }

    #[test]
    fn strangers_can_talk_by_default() {
        let store = store();
        let log = log_with(&store, SocialPolicy::default());
        let a = register(&store, "a");
        let b = register(&store, "b");

        assert!(log.send_message(&a, &b, "hey stranger").is_ok());
    }

    #[test]
    fn strict_policy_requires_friendship() {
        let store = store();
        let policy = SocialPolicy {
            require_friendship_for_messaging: true,
            ..SocialPolicy::default()
        };
        let log = log_with(&store, policy);
        let shared = Arc::new(store.clone());
        let graph = RelationshipGraph::new(shared.clone(), shared);
        let a = register(&store, "a");
        let b = register(&store, "b");

        assert_eq!(
            log.send_message(&a, &b, "hey").unwrap_err(),
            RapportError::NotFriends { sender: a, receiver: b }
        );

        graph.send_friend_request(&a, &b).unwrap();
        assert!(log.send_message(&a, &b, "still pending").is_err());

        graph.accept_friend_request(&b, &a).unwrap();
        log.send_message(&a, &b, "now we talk").unwrap();
        log.send_message(&b, &a, "indeed").unwrap();
        assert_eq!(
            texts(&log.get_conversation(&a, &b).unwrap()),
            vec!["now we talk", "indeed"]
        );
    }

    #[test]
    fn conversations_are_isolated_per_pair() {
        let store = store();
        let log = log_with(&store, SocialPolicy::default());
        let (a, b, c) = (UserId::new(), UserId::new(), UserId::new());

        log.send_message(&a, &b, "ab").unwrap();
        log.send_message(&a, &c, "ac").unwrap();
        log.send_message(&c, &b, "cb").unwrap();

        assert_eq!(texts(&log.get_conversation(&a, &b).unwrap()), vec!["ab"]);
        assert_eq!(texts(&log.get_conversation(&c, &a).unwrap()), vec!["ac"]);
        assert_eq!(texts(&log.get_conversation(&b, &c).unwrap()), vec!["cb"]);
    }

    #[test]
    fn reopened_log_continues_after_latest_message() {
        let store = store();
        let first = log_with(&store, SocialPolicy::default());
        let (a, b) = (UserId::new(), UserId::new());
        let earlier = first.send_message(&a, &b, "before restart").unwrap();

        let second = log_with(&store, SocialPolicy::default());
        let later = second.send_message(&b, &a, "after restart").unwrap();
        assert!(later.created_at >= earlier.created_at);
        assert_eq!(
            texts(&second.get_conversation(&a, &b).unwrap()),
            vec!["before restart", "after restart"]
        );
    }
}
