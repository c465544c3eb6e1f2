use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Store category. Categories nest through `parent_category_id`, which always
/// points at a category in the same store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    #[serde(rename = "storeID")]
    pub store_id: Uuid,
    #[serde(rename = "parentCategoryID")]
    pub parent_category_id: Option<Uuid>,
    pub name: String,
    pub article: Option<String>,
    #[serde(rename = "iconURL")]
    pub icon_url: String,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(
        store_id: Uuid,
        parent_category_id: Option<Uuid>,
        name: impl Into<String>,
        article: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            store_id,
            parent_category_id,
            name: name.into(),
            article,
            icon_url: String::new(),
            created_at: Utc::now(),
        }
    }
}

/// Arena of one store's categories.
///
/// Nodes live in a flat `Vec`; parent/child links are indices into it.
/// A node whose parent is not part of the arena is treated as a root.
#[derive(Debug, Default)]
pub struct CategoryTree {
    nodes: Vec<Category>,
    index: HashMap<Uuid, usize>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
}

/// Borrowed nested view used for JSON output.
#[derive(Debug, Serialize)]
pub struct CategoryNode<'a> {
    #[serde(flatten)]
    pub category: &'a Category,
    pub children: Vec<CategoryNode<'a>>,
}

impl CategoryTree {
    pub fn build(categories: Vec<Category>) -> Self {
        let index: HashMap<Uuid, usize> = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id, i))
            .collect();

        let mut children = vec![Vec::new(); categories.len()];
        let mut roots = Vec::new();

        for (i, category) in categories.iter().enumerate() {
            match category.parent_category_id.and_then(|p| index.get(&p)) {
                Some(&parent) if parent != i => children[parent].push(i),
                _ => roots.push(i),
            }
        }

        Self {
            nodes: categories,
            index,
            children,
            roots,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Category> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn roots(&self) -> impl Iterator<Item = &Category> {
        self.roots.iter().map(move |&i| &self.nodes[i])
    }

    pub fn children(&self, id: Uuid) -> impl Iterator<Item = &Category> {
        self.index
            .get(&id)
            .into_iter()
            .flat_map(move |&i| self.children[i].iter())
            .map(move |&i| &self.nodes[i])
    }

    /// Parent chain from the direct parent up to the root.
    pub fn ancestors(&self, id: Uuid) -> Vec<Uuid> {
        let mut out = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut current = self.get(id).and_then(|c| c.parent_category_id);

        while let Some(parent) = current {
            if !seen.insert(parent) {
                break;
            }
            let Some(node) = self.get(parent) else { break };
            out.push(parent);
            current = node.parent_category_id;
        }
        out
    }

    /// Every node below `id`, depth first.
    pub fn descendants(&self, id: Uuid) -> Vec<Uuid> {
        let Some(&start) = self.index.get(&id) else {
            return Vec::new();
        };

        let mut out = Vec::new();
        let mut seen = HashSet::from([start]);
        let mut stack: Vec<usize> = self.children[start].iter().rev().copied().collect();
        while let Some(i) = stack.pop() {
            if !seen.insert(i) {
                continue;
            }
            out.push(self.nodes[i].id);
            stack.extend(self.children[i].iter().rev().copied());
        }
        out
    }

    /// True when `candidate` is `id` itself or sits anywhere below it.
    pub fn is_in_subtree(&self, id: Uuid, candidate: Uuid) -> bool {
        id == candidate || self.ancestors(candidate).contains(&id)
    }

    pub fn to_nested(&self) -> Vec<CategoryNode<'_>> {
        self.roots.iter().map(|&i| self.node(i)).collect()
    }

    fn node(&self, i: usize) -> CategoryNode<'_> {
        CategoryNode {
            category: &self.nodes[i],
            children: self.children[i].iter().map(|&c| self.node(c)).collect(),
        }
    }
}
