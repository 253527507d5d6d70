//! Maintainer load ranking.
//!
//! Scores each maintainer by how much of the tower rests on them: every
//! non-root package contributes its depth, split across its maintainers and
//! weighted by role. The people at the top of this list are the ones a lot
//! of the graph quietly depends on.

use std::collections::BTreeMap;

use crate::dag::{Dag, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    Owner,
    Lead,
    Maintainer,
}

impl Role {
    fn weight(self) -> f64 {
        match self {
            Role::Owner => 3.0,
            Role::Lead => 1.5,
            Role::Maintainer => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackageRole {
    pub package: String,
    pub role: Role,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaintainerRanking {
    pub maintainer: String,
    pub score: f64,
    pub packages: Vec<PackageRole>,
}

pub fn rank_maintainers(g: &Dag, top_n: usize) -> Vec<MaintainerRanking> {
    let mut scores: BTreeMap<String, f64> = BTreeMap::new();
    let mut packages: BTreeMap<String, Vec<PackageRole>> = BTreeMap::new();
    let mut best_role: BTreeMap<String, Role> = BTreeMap::new();
    let min_row = g
        .nodes()
        .filter(|n| !n.is_synthetic())
        .map(|n| n.row)
        .min()
        .unwrap_or(0);

    for n in g.nodes() {
        if n.is_synthetic() || g.in_degree(&n.id) == 0 {
            continue;
        }

        let roles = maintainer_roles(n);
        if roles.is_empty() {
            continue;
        }

        let depth = n.row.saturating_sub(min_row) as f64;
        let share = depth / roles.len() as f64;
        let url = n
            .meta
            .get("repo_url")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        for (maintainer, role) in roles {
            *scores.entry(maintainer.clone()).or_insert(0.0) += share * role.weight();

            let pkgs = packages.entry(maintainer.clone()).or_default();
            if !pkgs.iter().any(|p| p.package == n.id) {
                pkgs.push(PackageRole {
                    package: n.id.clone(),
                    role,
                    url: url.clone(),
                });
            }

            best_role
                .entry(maintainer)
                .and_modify(|r| *r = (*r).min(role))
                .or_insert(role);
        }
    }

    let mut rankings: Vec<MaintainerRanking> = scores
        .into_iter()
        .map(|(maintainer, score)| {
            let mut pkgs = packages.remove(&maintainer).unwrap_or_default();
            pkgs.sort_by(|a, b| a.package.cmp(&b.package));
            MaintainerRanking {
                maintainer,
                score,
                packages: pkgs,
            }
        })
        .collect();

    rankings.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| best_role[&a.maintainer].cmp(&best_role[&b.maintainer]))
            .then_with(|| a.maintainer.cmp(&b.maintainer))
    });

    rankings.truncate(top_n);
    rankings
}

/// Role assignment from metadata: the repository owner keeps ownership; the
/// first listed non-owner maintainer is the lead; everyone else maintains.
/// An owner with no listed maintainers carries the package alone.
fn maintainer_roles(n: &Node) -> Vec<(String, Role)> {
    let owner = n
        .meta
        .get("repo_owner")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    let maintainers: Vec<&str> = n
        .meta
        .get("repo_maintainers")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();

    if maintainers.is_empty() {
        if owner.is_empty() {
            return Vec::new();
        }
        return vec![(owner.to_string(), Role::Owner)];
    }

    let mut roles = Vec::with_capacity(maintainers.len());
    let mut lead_assigned = false;
    for m in maintainers {
        let role = if m == owner {
            Role::Owner
        } else if !lead_assigned {
            lead_assigned = true;
            Role::Lead
        } else {
            Role::Maintainer
        };
        roles.push((m.to_string(), role));
    }
    roles
}
