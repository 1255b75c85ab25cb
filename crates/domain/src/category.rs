use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::Video;

/// A class together with every subject filed under it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub class: String,
    pub subjects: Vec<String>,
}

impl Category {
    /// Group videos by class. Classes and subjects come out sorted and de-duplicated.
    pub fn from_videos<'a>(videos: impl IntoIterator<Item = &'a Video>) -> Vec<Category> {
        let mut grouped: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for video in videos {
            grouped
                .entry(video.class.as_str())
                .or_default()
                .insert(video.subject.as_str());
        }

        grouped
            .into_iter()
            .map(|(class, subjects)| Category {
                class: class.to_string(),
                subjects: subjects.into_iter().map(str::to_string).collect(),
            })
            .collect()
    }
}
