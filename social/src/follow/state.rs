use roost_api::{BlockResult, FollowEdge, FollowerEdge, UserId};
use std::collections::HashMap;

/// Where a target's follow toggle stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TogglePhase {
    /// No toggle has been issued for this target.
    #[default]
    Idle,
    /// Flipped locally, API call not yet issued.
    Optimistic,
    /// API call in flight.
    AwaitingServer,
    /// Server agreed; a followings resync was requested.
    Reconciled,
    /// Server refused; the local flip was undone.
    RolledBack,
}

impl TogglePhase {
    /// Whether a toggle is still in flight.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Optimistic | Self::AwaitingServer)
    }
}

/// Which way a toggle flipped the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleDirection {
    /// Not following → following.
    Follow,
    /// Following → not following.
    Unfollow,
}

/// Last toggle issued for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleRecord {
    /// Current phase.
    pub phase: TogglePhase,
    /// Direction of the local flip.
    pub direction: ToggleDirection,
    /// Edge removed by an optimistic unfollow, restored on rollback.
    pub(crate) previous: Option<FollowEdge>,
}

/// Follow graph as seen by the signed-in user.
///
/// Both sides are kept twice: a presence map for lookups and an edge list
/// for display. Every id mapped to `true` has exactly one list entry and
/// every list entry is mapped to `true`. The mutators below are the only
/// way to change either, so the two never drift.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FollowState {
    followings: HashMap<UserId, bool>,
    followings_list: Vec<FollowEdge>,
    followers: HashMap<UserId, bool>,
    followers_list: Vec<FollowerEdge>,
    toggles: HashMap<UserId, ToggleRecord>,

    /// A plain (non-optimistic) request is in flight.
    pub loading: bool,

    /// Message of the last failure.
    pub error: Option<String>,
}

impl FollowState {
    /// State already following `edges`.
    #[must_use]
    pub fn with_followings(edges: Vec<FollowEdge>) -> Self {
        let mut state = Self::default();
        state.replace_followings(edges);
        state
    }

    /// Whether the user follows `id`.
    #[must_use]
    pub fn is_following(&self, id: UserId) -> bool {
        self.followings.get(&id).copied().unwrap_or(false)
    }

    /// Whether `id` follows the user.
    #[must_use]
    pub fn is_followed_by(&self, id: UserId) -> bool {
        self.followers.get(&id).copied().unwrap_or(false)
    }

    /// Followee presence map.
    #[must_use]
    pub const fn followings(&self) -> &HashMap<UserId, bool> {
        &self.followings
    }

    /// Followees in display order.
    #[must_use]
    pub fn followings_list(&self) -> &[FollowEdge] {
        &self.followings_list
    }

    /// Follower presence map.
    #[must_use]
    pub const fn followers(&self) -> &HashMap<UserId, bool> {
        &self.followers
    }

    /// Followers in display order.
    #[must_use]
    pub fn followers_list(&self) -> &[FollowerEdge] {
        &self.followers_list
    }

    /// Phase of the last toggle for `target`.
    #[must_use]
    pub fn toggle_phase(&self, target: UserId) -> TogglePhase {
        self.toggles
            .get(&target)
            .map_or(TogglePhase::Idle, |record| record.phase)
    }

    /// Last toggle record for `target`.
    #[must_use]
    pub fn toggle(&self, target: UserId) -> Option<&ToggleRecord> {
        self.toggles.get(&target)
    }

    /// Whether the presence maps and edge lists agree.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        fn agree(map: &HashMap<UserId, bool>, ids: &[UserId]) -> bool {
            let mut seen = std::collections::HashSet::new();
            ids.iter().all(|id| seen.insert(*id) && map.get(id) == Some(&true))
                && map.iter().filter(|(_, present)| **present).count() == ids.len()
        }

        let followees: Vec<UserId> = self.followings_list.iter().map(|e| e.followee_id).collect();
        let followers: Vec<UserId> = self.followers_list.iter().map(|e| e.follower_id).collect();
        agree(&self.followings, &followees) && agree(&self.followers, &followers)
    }

    pub(crate) fn insert_following(&mut self, edge: FollowEdge) {
        let id = edge.followee_id;
        self.followings.insert(id, true);
        if !self.followings_list.iter().any(|e| e.followee_id == id) {
            self.followings_list.push(edge);
        }
    }

    pub(crate) fn remove_following(&mut self, id: UserId) -> Option<FollowEdge> {
        self.followings.remove(&id);
        let index = self.followings_list.iter().position(|e| e.followee_id == id)?;
        Some(self.followings_list.remove(index))
    }

    /// Replace the followings with the server's list, then re-apply any
    /// toggle still in flight so a resync cannot undo it. Settled toggle
    /// records are dropped; the server list now speaks for them.
    pub(crate) fn replace_followings(&mut self, edges: Vec<FollowEdge>) {
        self.toggles.retain(|_, record| record.phase.is_pending());
        self.followings.clear();
        self.followings_list.clear();
        for edge in edges {
            self.insert_following(edge);
        }

        let pending: Vec<(UserId, ToggleDirection)> = self
            .toggles
            .iter()
            .filter(|(_, record)| record.phase.is_pending())
            .map(|(id, record)| (*id, record.direction))
            .collect();
        for (id, direction) in pending {
            match direction {
                ToggleDirection::Follow => self.insert_following(FollowEdge::new(id)),
                ToggleDirection::Unfollow => {
                    self.remove_following(id);
                },
            }
        }
    }

    pub(crate) fn replace_followers(&mut self, edges: Vec<FollowerEdge>) {
        self.followers.clear();
        self.followers_list.clear();
        for edge in edges {
            let id = edge.follower_id;
            if self.followers.insert(id, true).is_none() {
                self.followers_list.push(edge);
            }
        }
    }

    /// Copy a block change onto both lists.
    pub(crate) fn apply_block(&mut self, result: BlockResult) {
        for edge in &mut self.followings_list {
            if edge.followee_id == result.target_user_id {
                edge.blocked = result.blocked;
            }
        }
        for edge in &mut self.followers_list {
            if edge.follower_id == result.target_user_id {
                edge.blocked = result.blocked;
            }
        }
    }

    pub(crate) fn toggle_mut(&mut self, target: UserId) -> Option<&mut ToggleRecord> {
        self.toggles.get_mut(&target)
    }

    pub(crate) fn start_toggle(
        &mut self,
        target: UserId,
        direction: ToggleDirection,
        previous: Option<FollowEdge>,
    ) {
        self.toggles.insert(
            target,
            ToggleRecord {
                phase: TogglePhase::Optimistic,
                direction,
                previous,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64) -> UserId {
        UserId::new(id)
    }

    #[test]
    fn insert_then_remove_leaves_nothing_behind() {
        let mut state = FollowState::default();
        state.insert_following(FollowEdge::new(user(1)));
        state.insert_following(FollowEdge::new(user(1)));
        assert_eq!(state.followings_list().len(), 1);

        state.remove_following(user(1));
        assert!(!state.followings().contains_key(&user(1)));
        assert!(state.followings_list().is_empty());
        assert!(state.is_consistent());
    }

    #[test]
    fn replace_followings_drops_duplicate_entries() {
        let state = FollowState::with_followings(vec![
            FollowEdge::new(user(2)),
            FollowEdge::new(user(2)),
            FollowEdge::new(user(3)),
        ]);
        assert_eq!(state.followings_list().len(), 2);
        assert!(state.is_consistent());
    }

    #[test]
    fn resync_keeps_pending_toggle() {
        let mut state = FollowState::default();
        state.insert_following(FollowEdge::new(user(5)));
        state.start_toggle(user(5), ToggleDirection::Follow, None);

        state.replace_followings(vec![FollowEdge::new(user(6))]);

        assert!(state.is_following(user(5)));
        assert!(state.is_following(user(6)));
        assert!(state.is_consistent());
    }

    #[test]
    fn resync_forgets_settled_toggles() {
        let mut state = FollowState::default();
        for id in 1..=50 {
            state.start_toggle(user(id), ToggleDirection::Follow, None);
            if let Some(record) = state.toggle_mut(user(id)) {
                record.phase = TogglePhase::Reconciled;
            }
        }
        state.start_toggle(user(99), ToggleDirection::Follow, None);

        state.replace_followings(vec![FollowEdge::new(user(1))]);

        assert_eq!(state.toggles.len(), 1);
        assert_eq!(state.toggle_phase(user(1)), TogglePhase::Idle);
        assert!(state.toggle_phase(user(99)).is_pending());
        assert!(state.is_following(user(99)));
        assert!(state.is_consistent());
    }

    #[test]
    fn block_updates_both_sides() {
        let mut state = FollowState::with_followings(vec![FollowEdge::new(user(4))]);
        state.replace_followers(vec![FollowerEdge {
            follower_id: user(4),
            blocked: false,
            nickname: None,
        }]);

        state.apply_block(BlockResult {
            blocker_id: Some(user(1)),
            target_user_id: user(4),
            blocked: true,
        });

        assert!(state.followings_list()[0].blocked);
        assert!(state.followers_list()[0].blocked);
    }

    #[test]
    fn phase_defaults_to_idle() {
        let state = FollowState::default();
        assert_eq!(state.toggle_phase(user(9)), TogglePhase::Idle);
        assert!(!TogglePhase::Reconciled.is_pending());
        assert!(TogglePhase::AwaitingServer.is_pending());
    }
}
