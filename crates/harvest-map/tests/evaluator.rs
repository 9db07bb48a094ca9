use harvest_map::{index_by_for_value, resolve};
use harvest_model::{MappingRule, MappingRuleGroup, SetValue};
use proptest::prelude::*;

fn rule(for_values: Option<Vec<String>>, output: String) -> MappingRule {
    MappingRule {
        for_values,
        set_values: Some(vec![SetValue::String(output)]),
        ..MappingRule::default()
    }
}

fn arb_rules() -> impl Strategy<Value = Vec<(Option<Vec<String>>, String)>> {
    let input = prop::sample::select(vec!["a", "b", "c", "d"]).prop_map(str::to_string);
    let for_values = prop::option::weighted(0.8, prop::collection::vec(input, 1..3));
    prop::collection::vec((for_values, "[a-z]{1,6}"), 0..8)
}

fn group_from(rules: &[(Option<Vec<String>>, String)]) -> MappingRuleGroup {
    MappingRuleGroup::new(
        rules
            .iter()
            .map(|(for_values, output)| rule(for_values.clone(), output.clone()))
            .collect(),
    )
}

fn expected(rules: &[(Option<Vec<String>>, String)], input: &str) -> Option<String> {
    rules
        .iter()
        .find(|(for_values, _)| {
            for_values
                .as_ref()
                .is_some_and(|values| values.iter().any(|v| v == input))
        })
        .or_else(|| rules.iter().find(|(for_values, _)| for_values.is_none()))
        .map(|(_, output)| output.clone())
}

proptest! {
    #[test]
    fn resolve_is_first_match_then_default(
        rules in arb_rules(),
        input in prop::sample::select(vec!["a", "b", "c", "d", "z"]),
    ) {
        let group = group_from(&rules);
        let actual = resolve(&group, input)
            .and_then(|values| values.first())
            .and_then(SetValue::as_string);
        prop_assert_eq!(actual, expected(&rules, input));
    }

    #[test]
    fn index_agrees_with_explicit_matches(rules in arb_rules()) {
        let group = group_from(&rules);
        let index = index_by_for_value(&group);
        for (key, values) in &index {
            let first_match = rules
                .iter()
                .find(|(for_values, _)| {
                    for_values.as_ref().is_some_and(|v| v.iter().any(|v| v == key))
                })
                .map(|(_, output)| output.clone());
            prop_assert_eq!(values.first().and_then(SetValue::as_string), first_match);
        }
        prop_assert_eq!(index.len(), group.for_values().len());
    }
}
