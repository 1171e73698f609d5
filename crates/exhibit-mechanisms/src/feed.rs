//! Deterministic professional-network feed for the infinite scroll piece.
//!
//! Post `i` is always the same post: every field is derived from
//! `i * 7919` by modular selection, so the feed needs no storage and
//! renders identically on every visit.

use serde::Serialize;

const SEED_PRIME: u64 = 7919;

const ROLES: &[&str] = &[
    "Chief Innovation Officer",
    "VP of Digital Transformation",
    "Head of Engagement",
    "Director of Growth",
    "Senior Strategy Lead",
    "Principal Evangelist",
    "Customer Success Champion",
    "Community Manager",
    "Brand Ambassador",
];

const COMPANIES: &[&str] = &[
    "TechForward",
    "InnovateCorp",
    "FutureScale",
    "GrowthDynamics",
    "AgileMinds",
    "CloudVentures",
    "DataDriven Inc",
    "NextGen Solutions",
    "SynergyLabs",
];

const TEMPLATES: &[&str] = &[
    "Thrilled to announce our platform reached {metric} users! This milestone proves that {buzzword} is the future.",
    "Just wrapped an inspiring keynote on {topic}. The future of work is {buzzword}!",
    "Grateful to be recognized as a {award}. None of this would be possible without {buzzword}.",
    "Excited to share that we're {action}. This is what {buzzword} looks like in practice.",
    "Reflecting on my journey from {past} to {present}. Key lesson: embrace {buzzword}.",
    "Had an amazing conversation with {connection} about {topic}. Innovation requires {buzzword}!",
];

const BUZZWORDS: &[&str] = &[
    "human-centered design",
    "agile methodology",
    "growth mindset",
    "digital disruption",
    "authentic engagement",
    "data-driven decisions",
    "scalable impact",
    "synergistic collaboration",
];

/// One generated testimonial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedPost {
    /// Zero-based position in the feed.
    pub index: usize,
    pub author: String,
    pub role: &'static str,
    pub company: &'static str,
    pub content: String,
    pub avatar: String,
    pub likes: u64,
    pub comments: u64,
}

fn pick(list: &'static [&'static str], n: u64) -> &'static str {
    list[(n % list.len() as u64) as usize]
}

/// Generate post `index`.
pub fn generate_post(index: usize) -> FeedPost {
    let seed = index as u64 * SEED_PRIME;

    let template = pick(TEMPLATES, seed);
    let role = pick(ROLES, seed * 3);
    let company = pick(COMPANIES, seed * 5);
    let buzzword = pick(BUZZWORDS, seed * 11);

    // Each placeholder appears at most once per template.
    let content = template
        .replacen("{metric}", &format!("{}K", seed % 900 + 100), 1)
        .replacen("{buzzword}", buzzword, 1)
        .replacen("{topic}", "the future of digital engagement", 1)
        .replacen("{award}", "Top Voice in Innovation", 1)
        .replacen("{action}", "scaling to new markets", 1)
        .replacen("{past}", "junior analyst", 1)
        .replacen("{present}", &role.to_lowercase(), 1)
        .replacen("{connection}", "industry leaders", 1);

    FeedPost {
        index,
        author: format!("Professional {index}"),
        role,
        company,
        content,
        avatar: format!("avatar-{}", seed % 20),
        likes: (seed * 13) % 500,
        comments: (seed * 7) % 100,
    }
}

/// Posts `start..end`.
pub fn generate_range(start: usize, end: usize) -> impl Iterator<Item = FeedPost> {
    (start..end).map(generate_post)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_generation_is_deterministic() {
        assert_eq!(generate_post(42), generate_post(42));
        assert_ne!(generate_post(42), generate_post(43));
    }

    #[test]
    fn test_first_post() {
        let post = generate_post(0);
        assert_eq!(post.role, "Chief Innovation Officer");
        assert_eq!(post.company, "TechForward");
        assert_eq!(post.avatar, "avatar-0");
        assert_eq!(post.likes, 0);
        assert!(post.content.contains("100K users"));
        assert!(post.content.contains("human-centered design"));
    }

    #[test]
    fn test_known_index() {
        // seed = 7919: template 7919 % 6 = 5, metric unused.
        let post = generate_post(1);
        assert_eq!(post.author, "Professional 1");
        assert!(post.content.starts_with("Had an amazing conversation with industry leaders"));
        assert_eq!(post.likes, 7919 * 13 % 500);
        assert_eq!(post.comments, 7919 * 7 % 100);
        assert_eq!(post.avatar, "avatar-19");
    }

    #[test]
    fn test_no_unfilled_placeholders() {
        for post in generate_range(0, 250) {
            assert!(!post.content.contains('{'), "post {} unfilled", post.index);
        }
    }

    proptest! {
        #[test]
        fn prop_same_index_same_post(index in 0usize..100_000) {
            prop_assert_eq!(generate_post(index), generate_post(index));
        }

        #[test]
        fn prop_counters_in_range(index in 0usize..100_000) {
            let post = generate_post(index);
            prop_assert!(post.likes < 500);
            prop_assert!(post.comments < 100);
            prop_assert!(
                !post.content.contains('{'),
                "unfilled placeholder in {:?}",
                post.content
            );
        }
    }
}
