/// Chart x-axis labels `1..=number_of_days`.
pub fn chart_labels(number_of_days: usize) -> Vec<usize> {
    (1..=number_of_days).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_one_based() {
        assert_eq!(chart_labels(4), vec![1, 2, 3, 4]);
    }

    #[test]
    fn zero_days_has_no_labels() {
        assert!(chart_labels(0).is_empty());
    }
}
