use directory_client::Member;
use std::collections::HashSet;

/// Keep the first member seen for each email, preserving input order.
pub fn dedup_by_email(members: Vec<Member>) -> Vec<Member> {
    let mut seen = HashSet::with_capacity(members.len());
    members
        .into_iter()
        .filter(|member| seen.insert(member.email.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use directory_client::MemberType;
    use proptest::prelude::*;

    fn emails(members: &[Member]) -> Vec<&str> {
        members.iter().map(|m| m.email.as_str()).collect()
    }

    #[test]
    fn first_occurrence_wins() {
        let mut first = Member::user("a@co");
        first.role = Some("OWNER".to_string());
        let mut second = Member::user("a@co");
        second.role = Some("MEMBER".to_string());

        let result = dedup_by_email(vec![first, Member::user("b@co"), second]);

        assert_eq!(emails(&result), vec!["a@co", "b@co"]);
        assert_eq!(result[0].role.as_deref(), Some("OWNER"));
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(dedup_by_email(Vec::new()).is_empty());
    }

    #[test]
    fn emails_compare_exactly() {
        let result = dedup_by_email(vec![Member::user("A@co"), Member::user("a@co")]);
        assert_eq!(result.len(), 2);
    }

    fn arb_members() -> impl Strategy<Value = Vec<Member>> {
        // Small alphabet so duplicates are common.
        prop::collection::vec(
            (0u8..8, prop::bool::ANY).prop_map(|(n, external)| {
                let kind = if external {
                    MemberType::External
                } else {
                    MemberType::User
                };
                Member::with_type(format!("user{}@co", n), kind)
            }),
            0..32,
        )
    }

    proptest! {
        #[test]
        fn output_emails_are_unique_and_complete(members in arb_members()) {
            let result = dedup_by_email(members.clone());

            let unique: HashSet<&str> = result.iter().map(|m| m.email.as_str()).collect();
            prop_assert_eq!(unique.len(), result.len());

            let input: HashSet<&str> = members.iter().map(|m| m.email.as_str()).collect();
            prop_assert_eq!(unique, input);
        }

        #[test]
        fn idempotent(members in arb_members()) {
            let once = dedup_by_email(members);
            let twice = dedup_by_email(once.clone());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn identity_on_unique_input(ids in prop::collection::hash_set(0u16..1000, 0..32)) {
            let unique: Vec<Member> = ids
                .into_iter()
                .map(|n| Member::user(format!("user{}@co", n)))
                .collect();
            prop_assert_eq!(dedup_by_email(unique.clone()), unique);
        }
    }
}
