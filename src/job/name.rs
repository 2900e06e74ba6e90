use rand::Rng;

/// Characters Kubernetes uses for generated name suffixes: no vowels, no
/// look-alike digits
const SUFFIX_ALPHABET: &[u8] = b"bcdfghjklmnpqrstvwxz2456789";
const SUFFIX_LEN: usize = 5;

/// Returns `prefix` followed by a short random suffix
pub fn generate_job_name(prefix: &str) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.random_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect();
    format!("{prefix}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_name_shape() {
        let name = generate_job_name("prepare-data-job-");
        let suffix = name.strip_prefix("prepare-data-job-").unwrap();

        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix.bytes().all(|b| SUFFIX_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_names_do_not_collide() {
        let names: HashSet<String> = (0..200).map(|_| generate_job_name("job-")).collect();
        // 27^5 combinations; a handful of collisions in 200 draws would be a bug
        assert!(names.len() >= 198);
    }
}
