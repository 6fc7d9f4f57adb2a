//! Image consistency check

use envsweep_cloud::Instance;

/// Distinct known image references, in first-seen order
pub fn distinct_images<'a>(instances: impl IntoIterator<Item = &'a Instance>) -> Vec<&'a str> {
    let mut images: Vec<&str> = Vec::new();
    for image in instances.into_iter().filter_map(|i| i.image.as_deref()) {
        if !images.contains(&image) {
            images.push(image);
        }
    }
    images
}

/// True iff the instances were built from more than one known image.
/// Instances without an image reference are ignored.
pub fn images_differ<'a>(instances: impl IntoIterator<Item = &'a Instance>) -> bool {
    distinct_images(instances).len() > 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_image() {
        let instances = vec![
            Instance::new("1", "a").with_image("img-A"),
            Instance::new("2", "b").with_image("img-A"),
            Instance::new("3", "c").with_image("img-A"),
        ];
        assert!(!images_differ(&instances));
    }

    #[test]
    fn test_different_images() {
        let instances = vec![
            Instance::new("1", "a").with_image("img-A"),
            Instance::new("2", "b").with_image("img-B"),
            Instance::new("3", "c").with_image("img-A"),
        ];
        assert!(images_differ(&instances));
        assert_eq!(distinct_images(&instances), vec!["img-A", "img-B"]);
    }

    #[test]
    fn test_unknown_images_are_ignored() {
        let instances = vec![
            Instance::new("1", "a").with_image("img-A"),
            Instance::new("2", "b"),
        ];
        assert!(!images_differ(&instances));
        assert!(!images_differ(&Vec::<Instance>::new()));
    }
}
