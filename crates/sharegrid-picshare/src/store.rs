//! In-memory data store of the Picshare backend.
//!
//! All domain rules live here: account management, friendship symmetry,
//! picture visibility, likes, tags and comments. Handlers stay thin.
//!
//! Friendships are stored as directional rows; accepting a request always
//! creates both directions and deleting one removes both, so the relation
//! stays symmetric.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tracing::info;

use sharegrid_common::{SharegridError, now_millis};

use crate::model::{
    CommentView, ControlPanel, FriendRequestView, FriendView, MAX_COMMENT_LENGTH, PictureDetail,
    PictureSummary, UserDetail, UserSummary,
};

const MAX_TITLE_LENGTH: usize = 30;

#[derive(Clone, Debug)]
struct UserRecord {
    user_id: u64,
    username: String,
    password_hash: String,
}

#[derive(Clone, Debug)]
struct PictureRecord {
    picture_id: u64,
    title: String,
    author_id: u64,
    is_public: bool,
    image_path: String,
    submitted_at: i64,
    likes: HashSet<u64>,
    tags: HashSet<u64>,
}

#[derive(Clone, Debug)]
struct CommentRecord {
    comment_id: u64,
    picture_id: u64,
    author_id: u64,
    content: String,
    submitted_at: i64,
}

/// One direction of a friendship; the mirror row always exists.
#[derive(Clone, Debug)]
struct FriendshipRecord {
    friendship_id: u64,
    user_id: u64,
    friend_id: u64,
}

#[derive(Clone, Debug)]
struct FriendRequestRecord {
    request_id: u64,
    from_id: u64,
    to_id: u64,
}

/// Thread-safe in-memory store behind the Picshare API.
#[derive(Clone, Default)]
pub struct PicshareStore {
    users: Arc<DashMap<u64, UserRecord>>,
    users_by_name: Arc<DashMap<String, u64>>,
    pictures: Arc<DashMap<u64, PictureRecord>>,
    comments: Arc<DashMap<u64, CommentRecord>>,
    friendships: Arc<DashMap<u64, FriendshipRecord>>,
    friend_requests: Arc<DashMap<u64, FriendRequestRecord>>,
    next_id: Arc<AtomicU64>,
}

impl PicshareStore {
    pub fn new() -> Self {
        Self {
            next_id: Arc::new(AtomicU64::new(1)),
            ..Default::default()
        }
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    // ------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------

    pub fn signup(&self, username: &str, password: &str) -> Result<UserSummary, SharegridError> {
        if username.is_empty() || !username.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(SharegridError::IllegalArgument(
                "username must be non-empty and alphanumeric".to_string(),
            ));
        }
        if password.is_empty() {
            return Err(SharegridError::IllegalArgument(
                "password must not be empty".to_string(),
            ));
        }

        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
            .map_err(|e| SharegridError::InternalError(e.to_string()))?;

        match self.users_by_name.entry(username.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(SharegridError::Conflict(format!(
                "username '{}' is already taken",
                username
            ))),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                let user_id = self.next_id();
                self.users.insert(
                    user_id,
                    UserRecord {
                        user_id,
                        username: username.to_string(),
                        password_hash,
                    },
                );
                entry.insert(user_id);

                info!(user_id, username, "User signed up");
                Ok(UserSummary {
                    user_id,
                    username: username.to_string(),
                })
            }
        }
    }

    /// Check credentials. The error never says whether the username or the
    /// password was wrong.
    pub fn login(&self, username: &str, password: &str) -> Result<UserSummary, SharegridError> {
        let denied = || SharegridError::AuthError("unknown user or wrong password".to_string());

        let user_id = *self.users_by_name.get(username).ok_or_else(denied)?;
        let user = self.users.get(&user_id).ok_or_else(denied)?;

        if !bcrypt::verify(password, &user.password_hash).unwrap_or(false) {
            return Err(denied());
        }

        Ok(UserSummary {
            user_id: user.user_id,
            username: user.username.clone(),
        })
    }

    pub fn user_by_name(&self, username: &str) -> Result<UserSummary, SharegridError> {
        let user_id = *self
            .users_by_name
            .get(username)
            .ok_or_else(|| SharegridError::UserNotExist(username.to_string()))?;
        Ok(UserSummary {
            user_id,
            username: username.to_string(),
        })
    }

    fn username_of(&self, user_id: u64) -> String {
        self.users
            .get(&user_id)
            .map(|u| u.username.clone())
            .unwrap_or_default()
    }

    /// Substring search over all usernames.
    pub fn search_users(&self, query: &str) -> Vec<String> {
        let mut matched: Vec<String> = self
            .users
            .iter()
            .filter(|entry| entry.value().username.contains(query))
            .map(|entry| entry.value().username.clone())
            .collect();
        matched.sort();
        matched
    }

    // ------------------------------------------------------------------
    // Friendships
    // ------------------------------------------------------------------

    pub fn are_friends(&self, user_id: u64, other_id: u64) -> bool {
        self.friendships
            .iter()
            .any(|entry| entry.value().user_id == user_id && entry.value().friend_id == other_id)
    }

    pub fn send_friend_request(
        &self,
        from_id: u64,
        to_id: u64,
    ) -> Result<FriendRequestView, SharegridError> {
        if from_id == to_id {
            return Err(SharegridError::IllegalArgument(
                "cannot send a friend request to yourself".to_string(),
            ));
        }
        if !self.users.contains_key(&to_id) {
            return Err(SharegridError::NotFound(format!("user {}", to_id)));
        }
        if self.are_friends(from_id, to_id) {
            return Err(SharegridError::Conflict("already friends".to_string()));
        }

        let duplicate = self.friend_requests.iter().any(|entry| {
            let req = entry.value();
            (req.from_id == from_id && req.to_id == to_id)
                || (req.from_id == to_id && req.to_id == from_id)
        });
        if duplicate {
            return Err(SharegridError::Conflict(
                "a friend request is already pending".to_string(),
            ));
        }

        let request_id = self.next_id();
        self.friend_requests.insert(
            request_id,
            FriendRequestRecord {
                request_id,
                from_id,
                to_id,
            },
        );

        info!(request_id, from_id, to_id, "Friend request sent");
        Ok(FriendRequestView {
            request_id,
            from: self.username_of(from_id),
            to: self.username_of(to_id),
        })
    }

    /// Accept or decline a pending request. Only the recipient may resolve
    /// it; accepting creates the friendship in both directions.
    pub fn resolve_friend_request(
        &self,
        request_id: u64,
        user_id: u64,
        accept: bool,
    ) -> Result<(), SharegridError> {
        let request = self
            .friend_requests
            .get(&request_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| SharegridError::NotFound(format!("friend request {}", request_id)))?;

        if request.to_id != user_id {
            return Err(SharegridError::AuthError(
                "only the recipient can resolve a friend request".to_string(),
            ));
        }

        self.friend_requests.remove(&request_id);

        if accept {
            for (user_id, friend_id) in [
                (request.to_id, request.from_id),
                (request.from_id, request.to_id),
            ] {
                let friendship_id = self.next_id();
                self.friendships.insert(
                    friendship_id,
                    FriendshipRecord {
                        friendship_id,
                        user_id,
                        friend_id,
                    },
                );
            }
            info!(request_id, "Friend request accepted");
        } else {
            info!(request_id, "Friend request declined");
        }

        Ok(())
    }

    /// Remove a friendship, both directions at once.
    pub fn delete_friend(&self, friendship_id: u64, user_id: u64) -> Result<(), SharegridError> {
        let row = self
            .friendships
            .get(&friendship_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| SharegridError::NotFound(format!("friendship {}", friendship_id)))?;

        if row.user_id != user_id {
            return Err(SharegridError::AuthError(
                "only your own friendships can be removed".to_string(),
            ));
        }

        let mirror_id = self.friendships.iter().find_map(|entry| {
            let mirror = entry.value();
            (mirror.user_id == row.friend_id && mirror.friend_id == row.user_id)
                .then_some(mirror.friendship_id)
        });

        self.friendships.remove(&friendship_id);
        if let Some(mirror_id) = mirror_id {
            self.friendships.remove(&mirror_id);
        }

        info!(friendship_id, "Friendship removed");
        Ok(())
    }

    pub fn friends_of(&self, user_id: u64) -> Vec<FriendView> {
        let mut friends: Vec<FriendView> = self
            .friendships
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| FriendView {
                friendship_id: entry.value().friendship_id,
                username: self.username_of(entry.value().friend_id),
            })
            .collect();
        friends.sort_by_key(|f| f.friendship_id);
        friends
    }

    /// Pending requests addressed to `user_id`.
    pub fn requests_for(&self, user_id: u64) -> Vec<FriendRequestView> {
        let mut requests: Vec<FriendRequestView> = self
            .friend_requests
            .iter()
            .filter(|entry| entry.value().to_id == user_id)
            .map(|entry| FriendRequestView {
                request_id: entry.value().request_id,
                from: self.username_of(entry.value().from_id),
                to: self.username_of(entry.value().to_id),
            })
            .collect();
        requests.sort_by_key(|r| r.request_id);
        requests
    }

    // ------------------------------------------------------------------
    // Pictures
    // ------------------------------------------------------------------

    pub fn add_picture(
        &self,
        author_id: u64,
        title: &str,
        is_public: bool,
        image_path: &str,
    ) -> Result<PictureSummary, SharegridError> {
        if title.is_empty() || title.chars().count() > MAX_TITLE_LENGTH {
            return Err(SharegridError::IllegalArgument(format!(
                "title must be between 1 and {} characters",
                MAX_TITLE_LENGTH
            )));
        }

        let picture_id = self.next_id();
        let record = PictureRecord {
            picture_id,
            title: title.to_string(),
            author_id,
            is_public,
            image_path: image_path.to_string(),
            submitted_at: now_millis(),
            likes: HashSet::new(),
            tags: HashSet::new(),
        };
        let summary = self.summary_of(&record);
        self.pictures.insert(picture_id, record);

        info!(picture_id, author_id, is_public, "Picture uploaded");
        Ok(summary)
    }

    /// Delete a picture and its comments. Author only.
    pub fn delete_picture(&self, picture_id: u64, user_id: u64) -> Result<(), SharegridError> {
        let author_id = self
            .pictures
            .get(&picture_id)
            .map(|entry| entry.value().author_id)
            .ok_or_else(|| SharegridError::NotFound(format!("picture {}", picture_id)))?;

        if author_id != user_id {
            return Err(SharegridError::AuthError(
                "only the author can delete a picture".to_string(),
            ));
        }

        self.pictures.remove(&picture_id);
        self.comments
            .retain(|_, comment| comment.picture_id != picture_id);

        info!(picture_id, "Picture deleted");
        Ok(())
    }

    fn summary_of(&self, record: &PictureRecord) -> PictureSummary {
        PictureSummary {
            picture_id: record.picture_id,
            title: record.title.clone(),
            author: self.username_of(record.author_id),
            is_public: record.is_public,
            image_path: record.image_path.clone(),
            submitted_at: record.submitted_at,
            like_count: record.likes.len(),
        }
    }

    fn pictures_where<F>(&self, predicate: F) -> Vec<PictureSummary>
    where
        F: Fn(&PictureRecord) -> bool,
    {
        let mut pictures: Vec<PictureSummary> = self
            .pictures
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| self.summary_of(entry.value()))
            .collect();
        pictures.sort_by_key(|p| p.picture_id);
        pictures
    }

    pub fn pictures_of(&self, user_id: u64) -> Vec<PictureSummary> {
        self.pictures_where(|p| p.author_id == user_id)
    }

    pub fn public_pictures(&self) -> Vec<PictureSummary> {
        self.pictures_where(|p| p.is_public)
    }

    /// Pictures authored by the user's friends, private ones included.
    pub fn friends_pictures(&self, user_id: u64) -> Vec<PictureSummary> {
        let friends: HashSet<u64> = self
            .friendships
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| entry.value().friend_id)
            .collect();
        self.pictures_where(|p| friends.contains(&p.author_id))
    }

    /// A user's profile: public pictures always, private ones only for the
    /// user themselves and their friends.
    pub fn user_detail(
        &self,
        viewer_id: u64,
        username: &str,
    ) -> Result<UserDetail, SharegridError> {
        let user = self.user_by_name(username)?;
        let private_access = viewer_id == user.user_id || self.are_friends(viewer_id, user.user_id);

        let public_pictures =
            self.pictures_where(|p| p.author_id == user.user_id && p.is_public);
        let private_pictures = private_access
            .then(|| self.pictures_where(|p| p.author_id == user.user_id && !p.is_public));

        Ok(UserDetail {
            user,
            private_access,
            public_pictures,
            private_pictures,
        })
    }

    /// Whether `viewer_id` may see the picture: public, own, or a friend's.
    fn can_view(&self, viewer_id: u64, record: &PictureRecord) -> bool {
        record.is_public
            || record.author_id == viewer_id
            || self.are_friends(viewer_id, record.author_id)
    }

    pub fn picture_detail(
        &self,
        viewer_id: u64,
        picture_id: u64,
    ) -> Result<PictureDetail, SharegridError> {
        let record = self
            .pictures
            .get(&picture_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| SharegridError::NotFound(format!("picture {}", picture_id)))?;

        if !self.can_view(viewer_id, &record) {
            return Err(SharegridError::AuthError(
                "this picture is private".to_string(),
            ));
        }

        let mut tags: Vec<String> = record.tags.iter().map(|id| self.username_of(*id)).collect();
        tags.sort();

        Ok(PictureDetail {
            picture: self.summary_of(&record),
            liked: record.likes.contains(&viewer_id),
            tags,
            comments: self.comments_for(picture_id),
        })
    }

    /// Toggle a like; returns whether the picture is now liked.
    pub fn toggle_like(&self, picture_id: u64, user_id: u64) -> Result<bool, SharegridError> {
        let mut record = self
            .pictures
            .get_mut(&picture_id)
            .ok_or_else(|| SharegridError::NotFound(format!("picture {}", picture_id)))?;

        let liked = if record.likes.contains(&user_id) {
            record.likes.remove(&user_id);
            false
        } else {
            record.likes.insert(user_id);
            true
        };
        Ok(liked)
    }

    pub fn add_tag(&self, picture_id: u64, tag_username: &str) -> Result<(), SharegridError> {
        let tagged = self.user_by_name(tag_username)?;
        let mut record = self
            .pictures
            .get_mut(&picture_id)
            .ok_or_else(|| SharegridError::NotFound(format!("picture {}", picture_id)))?;

        record.tags.insert(tagged.user_id);
        Ok(())
    }

    /// Remove the user's own tag from a picture.
    pub fn remove_tag(&self, picture_id: u64, user_id: u64) -> Result<(), SharegridError> {
        let mut record = self
            .pictures
            .get_mut(&picture_id)
            .ok_or_else(|| SharegridError::NotFound(format!("picture {}", picture_id)))?;

        record.tags.remove(&user_id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Comments
    // ------------------------------------------------------------------

    pub fn add_comment(
        &self,
        picture_id: u64,
        author_id: u64,
        content: &str,
    ) -> Result<CommentView, SharegridError> {
        if content.is_empty() {
            return Err(SharegridError::IllegalArgument(
                "comment must not be empty".to_string(),
            ));
        }
        if content.chars().count() > MAX_COMMENT_LENGTH {
            return Err(SharegridError::IllegalArgument(format!(
                "comment exceeds {} characters",
                MAX_COMMENT_LENGTH
            )));
        }
        if !self.pictures.contains_key(&picture_id) {
            return Err(SharegridError::NotFound(format!("picture {}", picture_id)));
        }

        let comment_id = self.next_id();
        let record = CommentRecord {
            comment_id,
            picture_id,
            author_id,
            content: content.to_string(),
            submitted_at: now_millis(),
        };
        let view = CommentView {
            comment_id,
            author: self.username_of(author_id),
            content: record.content.clone(),
            submitted_at: record.submitted_at,
        };
        self.comments.insert(comment_id, record);
        Ok(view)
    }

    /// Delete a comment. Allowed for the comment author and for the author
    /// of the picture it sits on.
    pub fn delete_comment(&self, comment_id: u64, user_id: u64) -> Result<(), SharegridError> {
        let comment = self
            .comments
            .get(&comment_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| SharegridError::NotFound(format!("comment {}", comment_id)))?;

        let picture_author = self
            .pictures
            .get(&comment.picture_id)
            .map(|entry| entry.value().author_id);

        if comment.author_id != user_id && picture_author != Some(user_id) {
            return Err(SharegridError::AuthError(
                "not allowed to delete this comment".to_string(),
            ));
        }

        self.comments.remove(&comment_id);
        Ok(())
    }

    pub fn comments_for(&self, picture_id: u64) -> Vec<CommentView> {
        let mut comments: Vec<CommentView> = self
            .comments
            .iter()
            .filter(|entry| entry.value().picture_id == picture_id)
            .map(|entry| CommentView {
                comment_id: entry.value().comment_id,
                author: self.username_of(entry.value().author_id),
                content: entry.value().content.clone(),
                submitted_at: entry.value().submitted_at,
            })
            .collect();
        comments.sort_by_key(|c| c.comment_id);
        comments
    }

    // ------------------------------------------------------------------
    // Control panel
    // ------------------------------------------------------------------

    pub fn control_panel(&self, user_id: u64) -> Result<ControlPanel, SharegridError> {
        let user = self
            .users
            .get(&user_id)
            .map(|u| UserSummary {
                user_id: u.user_id,
                username: u.username.clone(),
            })
            .ok_or_else(|| SharegridError::NotFound(format!("user {}", user_id)))?;

        Ok(ControlPanel {
            friends: self.friends_of(user_id),
            friend_requests: self.requests_for(user_id),
            pictures: self.pictures_of(user_id),
            user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_users() -> (PicshareStore, u64, u64) {
        let store = PicshareStore::new();
        let alice = store.signup("alice", "wonder").unwrap().user_id;
        let bob = store.signup("bob", "builder").unwrap().user_id;
        (store, alice, bob)
    }

    fn make_friends(store: &PicshareStore, a: u64, b: u64) {
        let request = store.send_friend_request(a, b).unwrap();
        store
            .resolve_friend_request(request.request_id, b, true)
            .unwrap();
    }

    #[test]
    fn test_signup_and_login() {
        let (store, _, _) = store_with_users();
        assert!(store.login("alice", "wonder").is_ok());
        assert!(store.login("alice", "builder").is_err());
        assert!(store.login("carol", "whatever").is_err());
    }

    #[test]
    fn test_signup_rejects_duplicates_and_bad_names() {
        let (store, _, _) = store_with_users();
        assert!(matches!(
            store.signup("alice", "again"),
            Err(SharegridError::Conflict(_))
        ));
        assert!(store.signup("no spaces", "pw").is_err());
        assert!(store.signup("", "pw").is_err());
        assert!(store.signup("carol", "").is_err());
    }

    #[test]
    fn test_friendship_accept_is_symmetric() {
        let (store, alice, bob) = store_with_users();
        make_friends(&store, alice, bob);

        assert!(store.are_friends(alice, bob));
        assert!(store.are_friends(bob, alice));
        assert_eq!(store.friends_of(alice).len(), 1);
        assert_eq!(store.friends_of(bob).len(), 1);
    }

    #[test]
    fn test_friendship_decline_leaves_nothing() {
        let (store, alice, bob) = store_with_users();
        let request = store.send_friend_request(alice, bob).unwrap();
        store
            .resolve_friend_request(request.request_id, bob, false)
            .unwrap();

        assert!(!store.are_friends(alice, bob));
        assert!(store.requests_for(bob).is_empty());
    }

    #[test]
    fn test_only_recipient_resolves_request() {
        let (store, alice, bob) = store_with_users();
        let request = store.send_friend_request(alice, bob).unwrap();

        assert!(matches!(
            store.resolve_friend_request(request.request_id, alice, true),
            Err(SharegridError::AuthError(_))
        ));
        assert_eq!(store.requests_for(bob).len(), 1);
    }

    #[test]
    fn test_delete_friend_removes_both_directions() {
        let (store, alice, bob) = store_with_users();
        make_friends(&store, alice, bob);

        let friendship = store.friends_of(alice).remove(0);
        store.delete_friend(friendship.friendship_id, alice).unwrap();

        assert!(!store.are_friends(alice, bob));
        assert!(!store.are_friends(bob, alice));
    }

    #[test]
    fn test_duplicate_friend_request_rejected() {
        let (store, alice, bob) = store_with_users();
        store.send_friend_request(alice, bob).unwrap();

        assert!(store.send_friend_request(alice, bob).is_err());
        // Also rejected in the opposite direction while one is pending.
        assert!(store.send_friend_request(bob, alice).is_err());
    }

    #[test]
    fn test_private_pictures_gated_by_friendship() {
        let (store, alice, bob) = store_with_users();
        store
            .add_picture(alice, "holiday", false, "alice/holiday.jpg")
            .unwrap();

        let detail = store.user_detail(bob, "alice").unwrap();
        assert!(!detail.private_access);
        assert!(detail.private_pictures.is_none());

        make_friends(&store, bob, alice);
        let detail = store.user_detail(bob, "alice").unwrap();
        assert!(detail.private_access);
        assert_eq!(detail.private_pictures.unwrap().len(), 1);
    }

    #[test]
    fn test_picture_detail_access() {
        let (store, alice, bob) = store_with_users();
        let picture = store
            .add_picture(alice, "holiday", false, "alice/holiday.jpg")
            .unwrap();

        assert!(matches!(
            store.picture_detail(bob, picture.picture_id),
            Err(SharegridError::AuthError(_))
        ));
        assert!(store.picture_detail(alice, picture.picture_id).is_ok());

        make_friends(&store, bob, alice);
        assert!(store.picture_detail(bob, picture.picture_id).is_ok());
    }

    #[test]
    fn test_friends_pictures_listing() {
        let (store, alice, bob) = store_with_users();
        store
            .add_picture(alice, "public", true, "alice/p.jpg")
            .unwrap();
        store
            .add_picture(alice, "private", false, "alice/q.jpg")
            .unwrap();

        assert!(store.friends_pictures(bob).is_empty());

        make_friends(&store, bob, alice);
        assert_eq!(store.friends_pictures(bob).len(), 2);
        assert_eq!(store.public_pictures().len(), 1);
    }

    #[test]
    fn test_like_toggles() {
        let (store, alice, bob) = store_with_users();
        let picture = store
            .add_picture(alice, "holiday", true, "alice/h.jpg")
            .unwrap();

        assert!(store.toggle_like(picture.picture_id, bob).unwrap());
        assert!(!store.toggle_like(picture.picture_id, bob).unwrap());
    }

    #[test]
    fn test_tags_add_and_remove() {
        let (store, alice, bob) = store_with_users();
        let picture = store
            .add_picture(alice, "holiday", true, "alice/h.jpg")
            .unwrap();

        store.add_tag(picture.picture_id, "bob").unwrap();
        let detail = store.picture_detail(alice, picture.picture_id).unwrap();
        assert_eq!(detail.tags, vec!["bob"]);

        store.remove_tag(picture.picture_id, bob).unwrap();
        let detail = store.picture_detail(alice, picture.picture_id).unwrap();
        assert!(detail.tags.is_empty());

        assert!(store.add_tag(picture.picture_id, "nobody").is_err());
    }

    #[test]
    fn test_comment_validation() {
        let (store, alice, bob) = store_with_users();
        let picture = store
            .add_picture(alice, "holiday", true, "alice/h.jpg")
            .unwrap();

        assert!(store.add_comment(picture.picture_id, bob, "").is_err());
        assert!(
            store
                .add_comment(picture.picture_id, bob, &"x".repeat(MAX_COMMENT_LENGTH + 1))
                .is_err()
        );

        let comment = store
            .add_comment(picture.picture_id, bob, "nice shot")
            .unwrap();
        assert_eq!(comment.author, "bob");
        assert_eq!(store.comments_for(picture.picture_id).len(), 1);
    }

    #[test]
    fn test_limits_count_characters_not_bytes() {
        let (store, alice, bob) = store_with_users();
        // 30 two-byte characters is a valid title, 140 a valid comment.
        let picture = store
            .add_picture(alice, &"é".repeat(MAX_TITLE_LENGTH), true, "alice/h.jpg")
            .unwrap();
        assert!(
            store
                .add_comment(picture.picture_id, bob, &"é".repeat(MAX_COMMENT_LENGTH))
                .is_ok()
        );
        assert!(
            store
                .add_comment(picture.picture_id, bob, &"é".repeat(MAX_COMMENT_LENGTH + 1))
                .is_err()
        );
    }

    #[test]
    fn test_comment_deletion_permissions() {
        let (store, alice, bob) = store_with_users();
        let carol = store.signup("carol", "pw").unwrap().user_id;
        let picture = store
            .add_picture(alice, "holiday", true, "alice/h.jpg")
            .unwrap();
        let comment = store
            .add_comment(picture.picture_id, bob, "nice shot")
            .unwrap();

        // A bystander cannot delete it; the picture author can.
        assert!(store.delete_comment(comment.comment_id, carol).is_err());
        assert!(store.delete_comment(comment.comment_id, alice).is_ok());
    }

    #[test]
    fn test_delete_picture_cascades_comments() {
        let (store, alice, bob) = store_with_users();
        let picture = store
            .add_picture(alice, "holiday", true, "alice/h.jpg")
            .unwrap();
        store
            .add_comment(picture.picture_id, bob, "nice shot")
            .unwrap();

        assert!(store.delete_picture(picture.picture_id, bob).is_err());
        store.delete_picture(picture.picture_id, alice).unwrap();
        assert!(store.comments_for(picture.picture_id).is_empty());
        assert!(store.public_pictures().is_empty());
    }

    #[test]
    fn test_search_users() {
        let (store, _, _) = store_with_users();
        store.signup("alicia", "pw").unwrap();

        assert_eq!(store.search_users("ali"), vec!["alice", "alicia"]);
        assert_eq!(store.search_users("bob"), vec!["bob"]);
        assert!(store.search_users("zzz").is_empty());
    }

    #[test]
    fn test_control_panel() {
        let (store, alice, bob) = store_with_users();
        store
            .add_picture(alice, "holiday", true, "alice/h.jpg")
            .unwrap();
        store.send_friend_request(bob, alice).unwrap();

        let panel = store.control_panel(alice).unwrap();
        assert_eq!(panel.user.username, "alice");
        assert_eq!(panel.pictures.len(), 1);
        assert_eq!(panel.friend_requests.len(), 1);
        assert!(panel.friends.is_empty());
    }

    #[test]
    fn test_title_validation() {
        let (store, alice, _) = store_with_users();
        assert!(store.add_picture(alice, "", true, "p.jpg").is_err());
        assert!(
            store
                .add_picture(alice, &"x".repeat(MAX_TITLE_LENGTH + 1), true, "p.jpg")
                .is_err()
        );
    }
}
