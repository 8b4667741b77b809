use crate::catalog::rules::Rules;
use crate::domain::recommendation::Recommendation;
use crate::pipeline::schedule::Schedule;

pub fn render(rules: &Rules, schedule: &Schedule<'_>, items: &[&Recommendation]) -> String {
    let included = |name: &str| items.iter().any(|i| i.name == name);
    let mut sections = Vec::new();

    for (slot, scheduled) in schedule.iter() {
        let names: Vec<&str> = scheduled
            .iter()
            .map(|r| r.name.as_str())
            .filter(|n| included(*n))
            .collect();
        if !names.is_empty() {
            sections.push(format!("{}: toma {}.", slot.label(), join_spanish(&names)));
        }
    }

    let dosage: Vec<String> = items
        .iter()
        .map(|i| format!("- {}: {}", i.name, i.dosage))
        .collect();
    if !dosage.is_empty() {
        sections.push(format!("Dosis:\n{}", dosage.join("\n")));
    }

    let tips: Vec<String> = items
        .iter()
        .filter(|i| !i.absorption_tips.trim().is_empty())
        .map(|i| format!("- {}: {}", i.name, i.absorption_tips.trim()))
        .collect();
    if !tips.is_empty() {
        sections.push(format!("Consejos de absorción:\n{}", tips.join("\n")));
    }

    let rest: Vec<String> = items
        .iter()
        .filter_map(|i| {
            rules
                .cycling_notes
                .iter()
                .find(|n| n.kind == i.kind)
                .map(|n| format!("- {}: {}", i.name, n.note))
        })
        .collect();
    if !rest.is_empty() {
        sections.push(format!("Periodos de descanso:\n{}", rest.join("\n")));
    }

    sections.join("\n\n")
}

fn join_spanish(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [one] => one.to_string(),
        [init @ .., last] => format!("{} y {}", init.join(", "), last),
    }
}
