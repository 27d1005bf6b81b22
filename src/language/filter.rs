use super::{
    core::{Catalog, WordEntry},
    pool::CharacterPool,
};

/// Words of `catalog`, in definition order, that can be spelled from `pool`.
///
/// With no pool the whole catalog is returned. An empty pool spells nothing.
pub fn filter_words(catalog: &Catalog, pool: Option<&CharacterPool>) -> Vec<WordEntry> {
    match pool {
        None => catalog.words.clone(),
        Some(pool) => catalog
            .words
            .iter()
            .filter(|word| pool.can_spell(&word.script))
            .cloned()
            .collect(),
    }
}

impl Catalog {
    pub fn filter(&self, pool: Option<&CharacterPool>) -> Vec<WordEntry> {
        filter_words(self, pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_word_catalog() -> Catalog {
        Catalog::from_entries(
            "test",
            vec![
                WordEntry::new("konnichiwa", "こんにちは"),
                WordEntry::new("arigatou", "ありがとう"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_no_pool_returns_full_catalog_in_order() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(filter_words(catalog, None), catalog.words);
    }

    #[test]
    fn test_konnichiwa_pool_excludes_arigatou() {
        // ありがとう needs あ, が, と and う, none of which are in the pool
        let catalog = two_word_catalog();
        let pool = CharacterPool::new("こんにちはり");

        let words = filter_words(&catalog, Some(&pool));

        assert_eq!(words, vec![WordEntry::new("konnichiwa", "こんにちは")]);
    }

    #[test]
    fn test_konnichiwa_pool_against_builtin() {
        let pool = CharacterPool::new("こんにちはり");
        let words = Catalog::builtin().unwrap().filter(Some(&pool));
        assert_eq!(words, vec![WordEntry::new("konnichiwa", "こんにちは")]);
    }

    #[test]
    fn test_empty_pool_returns_nothing() {
        let pool = CharacterPool::new("");
        assert!(Catalog::builtin().unwrap().filter(Some(&pool)).is_empty());
    }

    #[test]
    fn test_result_keeps_catalog_order() {
        // せ and す are given first but すし comes before せんせい in the catalog
        let pool = CharacterPool::new("せせんいすし");
        let words = Catalog::builtin().unwrap().filter(Some(&pool));
        let romaji: Vec<&str> = words.iter().map(|w| w.romanized.as_str()).collect();
        assert_eq!(romaji, vec!["sushi", "sensei"]);
    }

    #[test]
    fn test_shared_characters_are_not_consumed_across_words() {
        // すし and すいか both need the single す
        let pool = CharacterPool::new("すしいか");
        let words = Catalog::builtin().unwrap().filter(Some(&pool));
        let romaji: Vec<&str> = words.iter().map(|w| w.romanized.as_str()).collect();
        assert_eq!(romaji, vec!["sushi", "suika"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let catalog = Catalog::builtin().unwrap();
        let pool = CharacterPool::new("あらしかさみず");
        let first = catalog.filter(Some(&pool));
        let second = catalog.filter(Some(&pool));
        assert_eq!(first, second);
        assert_eq!(pool, CharacterPool::new("あらしかさみず"));
        assert_eq!(catalog.len(), 12);
    }
}
