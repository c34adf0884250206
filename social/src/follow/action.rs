use roost_api::{BlockResult, FollowEdge, FollowerEdge, UserId};

/// Inputs to [`FollowReducer`](super::FollowReducer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowAction {
    // Optimistic toggle
    /// Flip the follow edge to `target` now and reconcile with the server
    /// afterwards.
    Toggle {
        /// User to follow or unfollow.
        target: UserId,
    },
    /// Issue the API call for a flipped edge.
    ToggleSubmit {
        /// Toggled user.
        target: UserId,
    },
    /// The server accepted the toggle.
    ToggleConfirmed {
        /// Toggled user.
        target: UserId,
    },
    /// The server refused the toggle.
    ToggleFailed {
        /// Toggled user.
        target: UserId,
        /// Normalized failure message.
        error: String,
    },

    // Plain requests
    /// Follow `followee_id` and wait for the server.
    Follow {
        /// User to follow.
        followee_id: UserId,
    },
    /// The server created the edge.
    FollowSucceeded {
        /// The new edge.
        edge: FollowEdge,
    },
    /// Following failed.
    FollowFailed {
        /// Normalized failure message.
        error: String,
    },
    /// Unfollow `followee_id` and wait for the server.
    Unfollow {
        /// User to unfollow.
        followee_id: UserId,
    },
    /// The server removed the edge.
    UnfollowSucceeded {
        /// User no longer followed.
        followee_id: UserId,
    },
    /// Unfollowing failed.
    UnfollowFailed {
        /// Normalized failure message.
        error: String,
    },

    // Lists
    /// Fetch who follows the user.
    LoadFollowers,
    /// Followers arrived.
    FollowersLoaded {
        /// Server list, replacing the local one.
        followers: Vec<FollowerEdge>,
    },
    /// Fetching followers failed.
    LoadFollowersFailed {
        /// Normalized failure message.
        error: String,
    },
    /// Fetch who the user follows.
    LoadFollowings,
    /// Followings arrived.
    FollowingsLoaded {
        /// Server list, replacing the local one.
        followings: Vec<FollowEdge>,
    },
    /// Fetching followings failed.
    LoadFollowingsFailed {
        /// Normalized failure message.
        error: String,
    },

    // Blocks
    /// Block or unblock `target`.
    UpdateBlock {
        /// User to (un)block.
        target: UserId,
        /// New block flag.
        blocked: bool,
    },
    /// The server applied the block change.
    BlockUpdated {
        /// Server echo of the change.
        result: BlockResult,
    },
    /// The block change failed.
    UpdateBlockFailed {
        /// Normalized failure message.
        error: String,
    },
}
