//! XGBoost JSON model evaluator
//!
//! Reads the document written by `Booster.save_model("model.json")` and
//! evaluates the tree ensemble the same way the library does:
//! - arithmetic in `f32`
//! - a node sends `x` left when `x < split_condition`, NaN follows `default_left`
//! - leaf values are stored in `split_conditions`
//! - margin = base margin + sum of one leaf per tree
//!
//! Supported: `gbtree` booster with a binary objective
//! (`binary:logistic`, `binary:logitraw`, `binary:hinge`). Categorical
//! splits, `dart`, and multi-class models are rejected at load time.

use crate::error::PipelineError;
use crate::model::Classifier;
use crate::types::{FeatureVector, FEATURE_NAMES};
use serde::Deserialize;

// ============================================================================
// Document layout
// ============================================================================

#[derive(Debug, Deserialize)]
struct ModelDocument {
    learner: LearnerDoc,
}

#[derive(Debug, Deserialize)]
struct LearnerDoc {
    #[serde(default)]
    feature_names: Vec<String>,
    gradient_booster: BoosterDoc,
    learner_model_param: LearnerModelParamDoc,
    objective: ObjectiveDoc,
}

#[derive(Debug, Deserialize)]
struct BoosterDoc {
    name: String,
    #[serde(default)]
    model: Option<GbTreeDoc>,
}

#[derive(Debug, Deserialize)]
struct GbTreeDoc {
    trees: Vec<TreeDoc>,
}

#[derive(Debug, Deserialize)]
struct TreeDoc {
    left_children: Vec<i32>,
    right_children: Vec<i32>,
    split_indices: Vec<i64>,
    split_conditions: Vec<f32>,
    default_left: Vec<Flag>,
    #[serde(default)]
    split_type: Vec<u8>,
}

/// Older writers emit 0/1, newer ones may emit booleans
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
}

impl Flag {
    fn is_set(&self) -> bool {
        match self {
            Flag::Bool(b) => *b,
            Flag::Int(i) => *i != 0,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LearnerModelParamDoc {
    base_score: String,
    #[serde(default)]
    num_class: Option<String>,
    #[serde(default)]
    num_feature: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObjectiveDoc {
    name: String,
}

// ============================================================================
// Evaluated form
// ============================================================================

/// Binary objective; decides how `base_score` maps to a margin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    Logistic,
    LogitRaw,
    Hinge,
}

impl Objective {
    fn parse(name: &str) -> Result<Self, PipelineError> {
        match name {
            "binary:logistic" => Ok(Objective::Logistic),
            "binary:logitraw" => Ok(Objective::LogitRaw),
            "binary:hinge" => Ok(Objective::Hinge),
            other => Err(invalid(format!("unsupported objective '{}'", other))),
        }
    }

    fn base_margin(&self, base_score: f32) -> Result<f32, PipelineError> {
        match self {
            Objective::Logistic => {
                if !(base_score > 0.0 && base_score < 1.0) {
                    return Err(invalid(format!(
                        "base_score {} is not a probability",
                        base_score
                    )));
                }
                Ok(-(1.0 / base_score - 1.0).ln())
            }
            Objective::LogitRaw | Objective::Hinge => Ok(base_score),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
        default_left: bool,
    },
    Leaf(f32),
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn from_doc(index: usize, doc: TreeDoc) -> Result<Self, PipelineError> {
        let n = doc.left_children.len();
        let lengths = [
            doc.right_children.len(),
            doc.split_indices.len(),
            doc.split_conditions.len(),
            doc.default_left.len(),
        ];
        if n == 0 || lengths.iter().any(|&len| len != n) {
            return Err(invalid(format!("tree {} has inconsistent node arrays", index)));
        }
        if doc.split_type.iter().any(|&t| t != 0) {
            return Err(invalid(format!("tree {} uses categorical splits", index)));
        }

        let child = |raw: i32| -> Result<usize, PipelineError> {
            usize::try_from(raw)
                .ok()
                .filter(|&c| c < n)
                .ok_or_else(|| invalid(format!("tree {} has child index {} out of range", index, raw)))
        };

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            if doc.left_children[i] == -1 {
                nodes.push(Node::Leaf(doc.split_conditions[i]));
                continue;
            }

            let feature = usize::try_from(doc.split_indices[i])
                .ok()
                .filter(|&f| f < FeatureVector::LEN)
                .ok_or_else(|| {
                    invalid(format!(
                        "tree {} splits on feature {} (model input has {})",
                        index,
                        doc.split_indices[i],
                        FeatureVector::LEN
                    ))
                })?;

            nodes.push(Node::Split {
                feature,
                threshold: doc.split_conditions[i],
                left: child(doc.left_children[i])?,
                right: child(doc.right_children[i])?,
                default_left: doc.default_left[i].is_set(),
            });
        }

        let tree = Tree { nodes };
        tree.check_reachable_acyclic(index)?;
        Ok(tree)
    }

    /// Every node reachable from the root is visited once
    ///
    /// Guarantees `leaf_value` terminates.
    fn check_reachable_acyclic(&self, index: usize) -> Result<(), PipelineError> {
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![0usize];

        while let Some(id) = stack.pop() {
            if std::mem::replace(&mut visited[id], true) {
                return Err(invalid(format!("tree {} is not a tree (node {} shared)", index, id)));
            }
            if let Node::Split { left, right, .. } = self.nodes[id] {
                stack.push(left);
                stack.push(right);
            }
        }

        Ok(())
    }

    fn leaf_value(&self, features: &[f32; FeatureVector::LEN]) -> f32 {
        let mut id = 0;
        loop {
            match self.nodes[id] {
                Node::Leaf(value) => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                } => {
                    let x = features[feature];
                    id = if x.is_nan() {
                        if default_left {
                            left
                        } else {
                            right
                        }
                    } else if x < threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

/// Gradient-boosted tree ensemble loaded from an XGBoost JSON model
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    trees: Vec<Tree>,
    base_margin: f32,
    objective: Objective,
}

impl TreeEnsemble {
    /// Parse and validate a model document
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, PipelineError> {
        let doc: ModelDocument = serde_json::from_slice(bytes)
            .map_err(|e| invalid(format!("not an XGBoost JSON model: {}", e)))?;
        let learner = doc.learner;

        if !learner.feature_names.is_empty() && learner.feature_names != FEATURE_NAMES {
            return Err(invalid(format!(
                "feature names {:?} do not match expected order {:?}",
                learner.feature_names, FEATURE_NAMES
            )));
        }

        let params = &learner.learner_model_param;
        if let Some(num_feature) = parse_count(params.num_feature.as_deref())? {
            if num_feature != FeatureVector::LEN {
                return Err(invalid(format!(
                    "model expects {} features, pipeline produces {}",
                    num_feature,
                    FeatureVector::LEN
                )));
            }
        }
        if let Some(num_class) = parse_count(params.num_class.as_deref())? {
            if num_class > 1 {
                return Err(invalid(format!("multi-class model ({} classes)", num_class)));
            }
        }

        let objective = Objective::parse(&learner.objective.name)?;
        let base_score = parse_base_score(&params.base_score)?;
        let base_margin = objective.base_margin(base_score)?;

        if learner.gradient_booster.name != "gbtree" {
            return Err(invalid(format!(
                "unsupported booster '{}'",
                learner.gradient_booster.name
            )));
        }
        let model = learner
            .gradient_booster
            .model
            .ok_or_else(|| invalid("gbtree booster has no model section"))?;

        let trees = model
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, doc)| Tree::from_doc(i, doc))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            trees,
            base_margin,
            objective,
        })
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn objective(&self) -> Objective {
        self.objective
    }

    /// Raw score before the objective's transform
    pub fn margin(&self, features: &FeatureVector) -> f32 {
        let x = features.as_array().map(|v| v as f32);
        self.trees
            .iter()
            .fold(self.base_margin, |acc, tree| acc + tree.leaf_value(&x))
    }
}

impl Classifier for TreeEnsemble {
    /// Class 1 when the transformed score exceeds 0.5
    ///
    /// For all supported objectives that is `margin > 0`.
    fn predict(&self, features: &FeatureVector) -> bool {
        self.margin(features) > 0.0
    }
}

fn invalid(reason: impl Into<String>) -> PipelineError {
    PipelineError::ModelUnavailable(reason.into())
}

/// Accepts `"5E-1"` and the bracketed `"[5E-1]"` form
fn parse_base_score(raw: &str) -> Result<f32, PipelineError> {
    let trimmed = raw.trim().trim_start_matches('[').trim_end_matches(']').trim();
    trimmed
        .parse::<f32>()
        .map_err(|_| invalid(format!("unreadable base_score '{}'", raw)))
}

fn parse_count(raw: Option<&str>) -> Result<Option<usize>, PipelineError> {
    match raw {
        None => Ok(None),
        Some(s) => s
            .trim()
            .parse::<usize>()
            .map(|n| if n == 0 { None } else { Some(n) })
            .map_err(|_| invalid(format!("unreadable count '{}'", s))),
    }
}
