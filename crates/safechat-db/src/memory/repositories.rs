//! Repository trait implementations for [`MemoryStore`]

use std::collections::HashMap;

use async_trait::async_trait;

use safechat_core::entities::{
    ApprovedContact, Chat, Flag, Message, ParentChildLink, PendingContactRequest,
    SurveillanceLevel, User,
};
use safechat_core::error::DomainError;
use safechat_core::traits::{
    ChatRepository, ContactRepository, FlagRepository, LinkRepository, MessageQuery,
    MessageRepository, RepoResult, UserRepository,
};
use safechat_core::value_objects::Snowflake;

use super::{MemoryStore, StoreFault};

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        self.check(StoreFault::Users)?;
        Ok(self.read(|t| t.users.get(&id).cloned()))
    }

    async fn create(&self, user: &User) -> RepoResult<()> {
        self.check(StoreFault::Users)?;
        self.write(|t| {
            if let Some(name) = user.kind.username() {
                let taken = t.users.values().any(|u| {
                    u.kind
                        .username()
                        .is_some_and(|other| other.eq_ignore_ascii_case(name))
                });
                if taken {
                    return Err(DomainError::ValidationError(
                        "username already taken".to_string(),
                    ));
                }
            }
            t.users.insert(user.id, user.clone());
            Ok(())
        })
    }
}

#[async_trait]
impl LinkRepository for MemoryStore {
    async fn find(
        &self,
        parent_id: Snowflake,
        child_id: Snowflake,
    ) -> RepoResult<Option<ParentChildLink>> {
        self.check(StoreFault::Links)?;
        Ok(self.read(|t| t.links.get(&(parent_id, child_id)).cloned()))
    }

    async fn find_for_parent_among(
        &self,
        parent_id: Snowflake,
        child_ids: &[Snowflake],
    ) -> RepoResult<Vec<ParentChildLink>> {
        self.check(StoreFault::Links)?;
        Ok(self.read(|t| {
            t.links
                .values()
                .filter(|l| l.parent_id == parent_id && child_ids.contains(&l.child_id))
                .cloned()
                .collect()
        }))
    }

    async fn find_by_parent(&self, parent_id: Snowflake) -> RepoResult<Vec<ParentChildLink>> {
        self.check(StoreFault::Links)?;
        let mut links: Vec<_> = self.read(|t| {
            t.links
                .values()
                .filter(|l| l.parent_id == parent_id)
                .cloned()
                .collect()
        });
        links.sort_by_key(|l| l.created_at);
        Ok(links)
    }

    async fn create(&self, link: &ParentChildLink) -> RepoResult<()> {
        self.check(StoreFault::Links)?;
        self.write(|t| {
            let key = (link.parent_id, link.child_id);
            if t.links.contains_key(&key) {
                return Err(DomainError::LinkExists);
            }
            t.links.insert(key, link.clone());
            Ok(())
        })
    }

    async fn update_level(
        &self,
        parent_id: Snowflake,
        child_id: Snowflake,
        level: SurveillanceLevel,
    ) -> RepoResult<bool> {
        self.check(StoreFault::Links)?;
        Ok(self.write(|t| match t.links.get_mut(&(parent_id, child_id)) {
            Some(link) => {
                link.surveillance_level = level;
                true
            }
            None => false,
        }))
    }

    async fn delete(&self, parent_id: Snowflake, child_id: Snowflake) -> RepoResult<bool> {
        self.check(StoreFault::Links)?;
        Ok(self.write(|t| t.links.remove(&(parent_id, child_id)).is_some()))
    }
}

#[async_trait]
impl ChatRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Chat>> {
        self.check(StoreFault::Chats)?;
        Ok(self.read(|t| t.chats.get(&id).cloned()))
    }

    async fn find_between(&self, a: Snowflake, b: Snowflake) -> RepoResult<Option<Chat>> {
        self.check(StoreFault::Chats)?;
        Ok(self.read(|t| t.chats.values().find(|c| c.is_between(a, b)).cloned()))
    }

    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<Chat>> {
        self.check(StoreFault::Chats)?;
        Ok(self.read(|t| {
            t.chats
                .values()
                .rev()
                .filter(|c| c.has_participant(user_id))
                .cloned()
                .collect()
        }))
    }

    async fn create(&self, chat: &Chat) -> RepoResult<()> {
        self.check(StoreFault::Chats)?;
        self.write(|t| {
            let exists = t
                .chats
                .values()
                .any(|c| c.is_between(chat.participant_a, chat.participant_b));
            if exists {
                return Err(DomainError::ChatExists);
            }
            t.chats.insert(chat.id, chat.clone());
            Ok(())
        })
    }
}

#[async_trait]
impl MessageRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        self.check(StoreFault::Messages)?;
        Ok(self.read(|t| t.messages.get(&id).cloned()))
    }

    async fn find_by_chat(
        &self,
        chat_id: Snowflake,
        query: MessageQuery,
    ) -> RepoResult<Vec<Message>> {
        self.check(StoreFault::Messages)?;
        let limit = usize::try_from(query.limit.clamp(1, 100)).unwrap_or(50);

        Ok(self.read(|t| {
            let in_chat = t.messages.values().filter(|m| m.chat_id == chat_id);
            match (query.before, query.after) {
                (Some(before), None) => in_chat
                    .filter(|m| m.id < before)
                    .rev()
                    .take(limit)
                    .cloned()
                    .collect(),
                (None, Some(after)) => in_chat
                    .filter(|m| m.id > after)
                    .take(limit)
                    .cloned()
                    .collect(),
                _ => in_chat.rev().take(limit).cloned().collect(),
            }
        }))
    }

    async fn latest_in_chat(&self, chat_id: Snowflake) -> RepoResult<Option<Message>> {
        self.check(StoreFault::Messages)?;
        Ok(self.read(|t| {
            t.messages
                .values()
                .rev()
                .find(|m| m.chat_id == chat_id)
                .cloned()
        }))
    }

    async fn create(&self, message: &Message) -> RepoResult<()> {
        self.check(StoreFault::Messages)?;
        self.write(|t| {
            t.messages.insert(message.id, message.clone());
        });
        Ok(())
    }
}

#[async_trait]
impl FlagRepository for MemoryStore {
    async fn create(&self, flag: &Flag) -> RepoResult<()> {
        self.check(StoreFault::Flags)?;
        self.write(|t| {
            t.flags.insert(flag.id, flag.clone());
        });
        Ok(())
    }

    async fn find_by_message_ids(
        &self,
        message_ids: &[Snowflake],
    ) -> RepoResult<HashMap<Snowflake, Vec<Flag>>> {
        self.check(StoreFault::Flags)?;
        Ok(self.read(|t| {
            let mut grouped: HashMap<Snowflake, Vec<Flag>> = HashMap::new();
            for flag in t.flags.values().filter(|f| message_ids.contains(&f.message_id)) {
                grouped.entry(flag.message_id).or_default().push(flag.clone());
            }
            grouped
        }))
    }

    async fn delete_by_message(&self, message_id: Snowflake) -> RepoResult<u64> {
        self.check(StoreFault::Flags)?;
        Ok(self.write(|t| {
            let before = t.flags.len();
            t.flags.retain(|_, f| f.message_id != message_id);
            (before - t.flags.len()) as u64
        }))
    }

    async fn exists_for_chat(&self, chat_id: Snowflake) -> RepoResult<bool> {
        self.check(StoreFault::Flags)?;
        Ok(self.read(|t| {
            t.flags.values().any(|f| {
                t.messages
                    .get(&f.message_id)
                    .is_some_and(|m| m.chat_id == chat_id)
            })
        }))
    }
}

#[async_trait]
impl ContactRepository for MemoryStore {
    async fn is_approved(&self, child_id: Snowflake, contact_id: Snowflake) -> RepoResult<bool> {
        self.check(StoreFault::Contacts)?;
        Ok(self.read(|t| t.approvals.contains_key(&(child_id, contact_id))))
    }

    async fn find_approved(&self, child_id: Snowflake) -> RepoResult<Vec<ApprovedContact>> {
        self.check(StoreFault::Contacts)?;
        let mut approved: Vec<_> = self.read(|t| {
            t.approvals
                .values()
                .filter(|a| a.child_id == child_id)
                .cloned()
                .collect()
        });
        approved.sort_by_key(|a| a.created_at);
        Ok(approved)
    }

    async fn insert_approval(&self, approval: &ApprovedContact) -> RepoResult<()> {
        self.check(StoreFault::Contacts)?;
        if self.has_fault(StoreFault::LoseApprovalWrites) {
            return Ok(());
        }
        self.write(|t| {
            t.approvals
                .entry((approval.child_id, approval.contact_id))
                .or_insert_with(|| approval.clone());
        });
        Ok(())
    }

    async fn approve_request(
        &self,
        request: &PendingContactRequest,
        approvals: &[ApprovedContact; 2],
    ) -> RepoResult<()> {
        self.check(StoreFault::Contacts)?;
        let keep = if self.has_fault(StoreFault::HalfApproval) {
            1
        } else {
            approvals.len()
        };

        self.write(|t| {
            for approval in approvals.iter().take(keep) {
                t.approvals
                    .entry((approval.child_id, approval.contact_id))
                    .or_insert_with(|| approval.clone());
            }
            t.requests.remove(&request.id);
        });
        Ok(())
    }

    async fn delete_pair(&self, a: Snowflake, b: Snowflake) -> RepoResult<u64> {
        self.check(StoreFault::Contacts)?;
        Ok(self.write(|t| {
            let removed = [t.approvals.remove(&(a, b)), t.approvals.remove(&(b, a))];
            removed.iter().filter(|r| r.is_some()).count() as u64
        }))
    }

    async fn find_request(&self, id: Snowflake) -> RepoResult<Option<PendingContactRequest>> {
        self.check(StoreFault::Contacts)?;
        Ok(self.read(|t| t.requests.get(&id).cloned()))
    }

    async fn find_request_between(
        &self,
        a: Snowflake,
        b: Snowflake,
    ) -> RepoResult<Option<PendingContactRequest>> {
        self.check(StoreFault::Contacts)?;
        Ok(self.read(|t| {
            t.requests
                .values()
                .find(|r| {
                    (r.child_id == a && r.contact_id == b) || (r.child_id == b && r.contact_id == a)
                })
                .cloned()
        }))
    }

    async fn find_requests_for(
        &self,
        contact_ids: &[Snowflake],
    ) -> RepoResult<Vec<PendingContactRequest>> {
        self.check(StoreFault::Contacts)?;
        Ok(self.read(|t| {
            t.requests
                .values()
                .filter(|r| contact_ids.contains(&r.contact_id))
                .cloned()
                .collect()
        }))
    }

    async fn create_request(&self, request: &PendingContactRequest) -> RepoResult<()> {
        self.check(StoreFault::Contacts)?;
        self.write(|t| {
            let duplicate = t
                .requests
                .values()
                .any(|r| r.child_id == request.child_id && r.contact_id == request.contact_id);
            if duplicate {
                return Err(DomainError::RequestExists);
            }
            t.requests.insert(request.id, request.clone());
            Ok(())
        })
    }

    async fn delete_request(&self, id: Snowflake) -> RepoResult<bool> {
        self.check(StoreFault::Contacts)?;
        Ok(self.write(|t| t.requests.remove(&id).is_some()))
    }
}
