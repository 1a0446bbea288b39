// Audio input source domain model

/// A capture device as reported by the platform audio tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSource {
    /// Platform identifier, passed back verbatim when switching.
    pub name: String,
    /// Position in the listing; not a platform index.
    pub index: usize,
    pub description: Option<String>,
}

impl AudioSource {
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = (!description.is_empty()).then_some(description);
        self
    }

    /// Description when the platform provides one, otherwise the name.
    pub fn display_name(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.name)
    }

    /// Loopback sources mirror an output device and are never microphones.
    pub fn is_monitor(&self) -> bool {
        self.name.to_lowercase().contains("monitor")
    }

    /// Case-insensitive substring match on name or description.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&query))
    }
}

/// Ordered list of sources. Every operation returns a new list in listing
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioSourceList {
    sources: Vec<AudioSource>,
}

impl AudioSourceList {
    pub fn new(sources: Vec<AudioSource>) -> Self {
        Self { sources }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn sources(&self) -> &[AudioSource] {
        &self.sources
    }

    pub fn into_sources(self) -> Vec<AudioSource> {
        self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AudioSource> {
        self.sources.iter()
    }

    pub fn filter_monitors(&self) -> Self {
        self.retain(|source| !source.is_monitor())
    }

    /// An empty query matches everything.
    pub fn filter_by_query(&self, query: &str) -> Self {
        if query.is_empty() {
            return self.clone();
        }
        self.retain(|source| source.matches_query(query))
    }

    /// First `max_count` sources, or all of them if there are fewer.
    pub fn limit(&self, max_count: usize) -> Self {
        Self::new(self.sources.iter().take(max_count).cloned().collect())
    }

    fn retain(&self, keep: impl Fn(&AudioSource) -> bool) -> Self {
        Self::new(self.sources.iter().filter(|s| keep(s)).cloned().collect())
    }
}

impl FromIterator<AudioSource> for AudioSourceList {
    fn from_iter<I: IntoIterator<Item = AudioSource>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a AudioSourceList {
    type Item = &'a AudioSource;
    type IntoIter = std::slice::Iter<'a, AudioSource>;

    fn into_iter(self) -> Self::IntoIter {
        self.sources.iter()
    }
}
