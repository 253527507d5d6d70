use cairn::perm::{factorial, generate, seq, Permutations};

#[test]
fn seq_counts_up() {
    assert_eq!(seq(0), Vec::<usize>::new());
    assert_eq!(seq(4), vec![0, 1, 2, 3]);
}

#[test]
fn factorials() {
    assert_eq!(factorial(0), 1);
    assert_eq!(factorial(1), 1);
    assert_eq!(factorial(5), 120);
    assert_eq!(factorial(12), 479_001_600);
}

#[test]
fn generate_produces_all_unique_permutations() {
    for n in 0..=6 {
        let perms = generate(n, 0);
        assert_eq!(perms.len() as u64, factorial(n), "n={n}");

        let unique: std::collections::HashSet<_> = perms.iter().collect();
        assert_eq!(unique.len(), perms.len(), "n={n} repeats a permutation");

        for p in &perms {
            let mut sorted = p.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, seq(n));
        }
    }
}

#[test]
fn generate_honors_the_limit() {
    assert_eq!(generate(5, 10).len(), 10);
    assert_eq!(generate(3, 100).len(), 6);
}

#[test]
fn first_permutation_is_identity() {
    let perms = generate(4, 1);
    assert_eq!(perms[0], vec![0, 1, 2, 3]);
}

#[test]
fn iterator_is_lazy_and_resumable() {
    let mut it = Permutations::new(3);
    assert_eq!(it.next(), Some(vec![0, 1, 2]));
    let rest: Vec<_> = it.collect();
    assert_eq!(rest.len(), 5);
}

#[test]
fn zero_elements_yield_one_empty_permutation() {
    let perms = generate(0, 0);
    assert_eq!(perms, vec![Vec::<usize>::new()]);
}
