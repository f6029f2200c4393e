//! Assembly of flat comment rows into reply trees.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CommentId, UserId};

/// One stored comment, already joined with its author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRow {
    pub id: CommentId,
    pub parent_id: Option<CommentId>,
    pub author_id: UserId,
    /// `"Name (role)"`
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentNode {
    pub id: CommentId,
    pub content: String,
    pub author: String,
    pub author_id: UserId,
    pub created: DateTime<Utc>,
    pub likes_count: u64,
    pub is_liked: bool,
    pub replies: Vec<CommentNode>,
}

/// Nests `rows` under their parents.
///
/// `rows` must be in store order; that order is kept at every level. Replies
/// are nested at any depth. A row whose parent is not part of `rows` is
/// dropped, since it cannot be reached from a top-level comment.
pub fn assemble(
    rows: Vec<CommentRow>,
    like_counts: &HashMap<CommentId, u64>,
    liked_by_viewer: &HashSet<CommentId>,
) -> Vec<CommentNode> {
    let mut top_level = Vec::new();
    let mut replies: HashMap<CommentId, Vec<CommentRow>> = HashMap::new();

    for row in rows {
        match row.parent_id {
            None => top_level.push(row),
            Some(parent_id) => replies.entry(parent_id).or_default().push(row),
        }
    }

    top_level
        .into_iter()
        .map(|row| build_node(row, &mut replies, like_counts, liked_by_viewer))
        .collect()
}

fn build_node(
    row: CommentRow,
    replies: &mut HashMap<CommentId, Vec<CommentRow>>,
    like_counts: &HashMap<CommentId, u64>,
    liked_by_viewer: &HashSet<CommentId>,
) -> CommentNode {
    // Removing the children up front guarantees each row is placed once
    let children = replies.remove(&row.id).unwrap_or_default();
    let nested = children
        .into_iter()
        .map(|child| build_node(child, replies, like_counts, liked_by_viewer))
        .collect();

    CommentNode {
        likes_count: like_counts.get(&row.id).copied().unwrap_or(0),
        is_liked: liked_by_viewer.contains(&row.id),
        id: row.id,
        content: row.content,
        author: row.author,
        author_id: row.author_id,
        created: row.created_at,
        replies: nested,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: CommentId, parent_id: Option<CommentId>) -> CommentRow {
        CommentRow {
            id,
            parent_id,
            author_id: UserId::new(),
            author: "Sam (student)".to_string(),
            content: format!("comment {id}"),
            created_at: Utc::now(),
        }
    }

    fn ids(nodes: &[CommentNode]) -> Vec<CommentId> {
        nodes.iter().map(|n| n.id).collect()
    }

    #[test]
    fn test_partition_and_nesting() {
        let [c1, c2, c3, c4] = [(); 4].map(|_| CommentId::new());
        let rows = vec![
            row(c1, None),
            row(c2, Some(c1)),
            row(c3, None),
            row(c4, Some(c2)),
        ];

        let threads = assemble(rows, &HashMap::new(), &HashSet::new());

        assert_eq!(ids(&threads), vec![c1, c3]);
        assert_eq!(ids(&threads[0].replies), vec![c2]);
        assert_eq!(ids(&threads[0].replies[0].replies), vec![c4]);
        assert!(threads[1].replies.is_empty());
    }

    #[test]
    fn test_replies_keep_store_order() {
        let parent = CommentId::new();
        let children: Vec<CommentId> = (0..4).map(|_| CommentId::new()).collect();

        let mut rows = vec![row(parent, None)];
        rows.extend(children.iter().map(|id| row(*id, Some(parent))));

        let threads = assemble(rows, &HashMap::new(), &HashSet::new());
        assert_eq!(ids(&threads[0].replies), children);
    }

    #[test]
    fn test_reply_listed_before_parent_is_still_nested() {
        let parent = CommentId::new();
        let child = CommentId::new();

        let threads = assemble(
            vec![row(child, Some(parent)), row(parent, None)],
            &HashMap::new(),
            &HashSet::new(),
        );

        assert_eq!(ids(&threads), vec![parent]);
        assert_eq!(ids(&threads[0].replies), vec![child]);
    }

    #[test]
    fn test_like_annotations() {
        let c1 = CommentId::new();
        let c2 = CommentId::new();
        let counts = HashMap::from([(c1, 3)]);
        let liked = HashSet::from([c1]);

        let threads = assemble(vec![row(c1, None), row(c2, Some(c1))], &counts, &liked);

        assert_eq!(threads[0].likes_count, 3);
        assert!(threads[0].is_liked);
        assert_eq!(threads[0].replies[0].likes_count, 0);
        assert!(!threads[0].replies[0].is_liked);
    }

    #[test]
    fn test_orphans_are_dropped() {
        let c1 = CommentId::new();
        let threads = assemble(
            vec![row(c1, None), row(CommentId::new(), Some(CommentId::new()))],
            &HashMap::new(),
            &HashSet::new(),
        );

        assert_eq!(ids(&threads), vec![c1]);
        assert!(threads[0].replies.is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(assemble(Vec::new(), &HashMap::new(), &HashSet::new()).is_empty());
    }
}
