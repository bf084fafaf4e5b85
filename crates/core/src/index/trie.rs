use std::collections::HashMap;

/// Case-insensitive prefix tree over movie titles.
///
/// Each node keeps the titles passing through it so a lookup costs one walk
/// down the prefix.
#[derive(Debug, Default)]
pub struct TitleTrie {
    root: Node,
}

#[derive(Debug, Default)]
struct Node {
    children: HashMap<char, Node>,
    titles: Vec<String>,
}

impl TitleTrie {
    pub fn insert(&mut self, title: &str) {
        if title.is_empty() {
            return;
        }
        let mut node = &mut self.root;
        for ch in title.to_lowercase().chars() {
            node = node.children.entry(ch).or_default();
            node.titles.push(title.to_string());
        }
    }

    /// Titles starting with `prefix` in insertion order; empty for an empty prefix.
    pub fn complete(&self, prefix: &str) -> &[String] {
        if prefix.is_empty() {
            return &[];
        }
        let mut node = &self.root;
        for ch in prefix.to_lowercase().chars() {
            match node.children.get(&ch) {
                Some(next) => node = next,
                None => return &[],
            }
        }
        &node.titles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_case_insensitively() {
        let mut trie = TitleTrie::default();
        trie.insert("The Matrix");
        trie.insert("The Mummy");
        trie.insert("Titanic");

        assert_eq!(trie.complete("the m"), ["The Matrix", "The Mummy"]);
        assert_eq!(trie.complete("TI"), ["Titanic"]);
        assert!(trie.complete("x").is_empty());
        assert!(trie.complete("").is_empty());
    }
}
