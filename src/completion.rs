use crate::models::{Act, SpeechTurn};

/// Parse the raw text units of a generated episode, in order, into acts.
pub fn parse_episode(units: &[String]) -> Vec<Act> {
    units
        .iter()
        .enumerate()
        .map(|(index, unit)| parse_act(unit, index, units.len()))
        .collect()
}

/// Parse the raw text units of a generated episode using recorded act
/// labels. Falls back to positional labeling when the labels are missing
/// or do not line up with the units (older saved records).
pub fn parse_episode_with_labels(units: &[String], labels: &[String]) -> Vec<Act> {
    if labels.len() != units.len() {
        return parse_episode(units);
    }
    units
        .iter()
        .zip(labels)
        .map(|(unit, label)| parse_labeled_act(unit, label))
        .collect()
}

/// Parse one raw completion unit into an act labeled by its position.
pub fn parse_act(raw: &str, index: usize, total: usize) -> Act {
    parse_labeled_act(raw, &positional_label(index, total))
}

/// Parse one raw completion unit into an act with an explicit label.
///
/// The model emits line-oriented text in the same shape the corpus was
/// trained on: `SPEAKER : SPEECH` per line, with occasional bracketed
/// stage directions. Lines that fit neither shape are skipped.
pub fn parse_labeled_act(raw: &str, label: &str) -> Act {
    let mut act = Act::new(label, label.to_uppercase());

    for line in raw.split('\n') {
        let (action, rest) = extract_action(line);
        if let Some(description) = action {
            act.turns.push(SpeechTurn::Action { description });
        }

        let Some((speaker, speech)) = rest.split_once(':') else {
            continue;
        };
        let speaker = speaker.trim();
        let speech = speech.trim();
        if speaker.is_empty() || speech.is_empty() {
            continue;
        }
        act.turns.push(SpeechTurn::Dialogue {
            speaker: speaker.to_string(),
            text: speech.to_string(),
        });
    }

    act
}

/// Label a unit by its position: the first unit is the prologue, the
/// last two are credits and post-credits, and everything between is
/// `act {n}` numbered from 1.
pub fn positional_label(index: usize, total: usize) -> String {
    if index == 0 {
        "prologue".to_string()
    } else if index + 1 == total {
        "post-credits".to_string()
    } else if index + 2 == total {
        "credits".to_string()
    } else {
        format!("act {}", index)
    }
}

/// Split the first `[...]` span out of a line, returning the trimmed
/// interior (if any) and the line with the span removed. Later spans are
/// left in place.
fn extract_action(line: &str) -> (Option<String>, String) {
    let Some(open) = line.find('[') else {
        return (None, line.to_string());
    };
    let Some(close) = line[open + 1..].find(']').map(|i| open + 1 + i) else {
        return (None, line.to_string());
    };

    let description = line[open + 1..close].trim();
    let mut rest = String::with_capacity(line.len());
    rest.push_str(&line[..open]);
    rest.push_str(&line[close + 1..]);

    if description.is_empty() {
        (None, rest)
    } else {
        (Some(description.to_string()), rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_labels_for_four_units() {
        let units: Vec<String> = vec!["a : 1".into(), "b : 2".into(), "c : 3".into(), "d : 4".into()];
        let acts = parse_episode(&units);

        let ids: Vec<_> = acts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["prologue", "act 1", "credits", "post-credits"]);

        let names: Vec<_> = acts.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["PROLOGUE", "ACT 1", "CREDITS", "POST-CREDITS"]);
    }

    #[test]
    fn test_recorded_labels_win_over_position() {
        // with credits skipped, position alone would call the last
        // queried act "credits"
        let units: Vec<String> = vec!["a : 1".into(), "b : 2".into(), "c : 3".into()];
        let labels: Vec<String> =
            vec!["prologue".into(), "act 1".into(), "post-credits".into()];

        let acts = parse_episode_with_labels(&units, &labels);
        let ids: Vec<_> = acts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["prologue", "act 1", "post-credits"]);
    }

    #[test]
    fn test_mismatched_labels_fall_back_to_position() {
        let units: Vec<String> = vec!["a : 1".into(), "b : 2".into()];
        let labels: Vec<String> = vec!["prologue".into()];

        let acts = parse_episode_with_labels(&units, &labels);
        let ids: Vec<_> = acts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["prologue", "post-credits"]);
    }

    #[test]
    fn test_two_units_are_prologue_and_post_credits() {
        let acts = parse_episode(&["a : 1".to_string(), "b : 2".to_string()]);
        let ids: Vec<_> = acts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["prologue", "post-credits"]);
    }

    #[test]
    fn test_bare_bracket_line_yields_single_action() {
        let act = parse_act("[LAUGHTER]", 1, 4);
        assert_eq!(
            act.turns,
            vec![SpeechTurn::Action {
                description: "LAUGHTER".to_string(),
            }]
        );
    }

    #[test]
    fn test_inline_action_precedes_dialogue() {
        let act = parse_act("HOST : well [PAUSE] okay", 1, 4);
        assert_eq!(
            act.turns,
            vec![
                SpeechTurn::Action {
                    description: "PAUSE".to_string(),
                },
                SpeechTurn::Dialogue {
                    speaker: "HOST".to_string(),
                    text: "well  okay".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_speech_keeps_colons_after_the_first() {
        let act = parse_act("Ira Glass : The time: 3 PM.", 1, 4);
        assert_eq!(
            act.turns,
            vec![SpeechTurn::Dialogue {
                speaker: "Ira Glass".to_string(),
                text: "The time: 3 PM.".to_string(),
            }]
        );
    }

    #[test]
    fn test_only_first_bracket_span_extracted() {
        let act = parse_act("[MUSIC] one : two [FADE]", 1, 4);
        assert_eq!(
            act.turns,
            vec![
                SpeechTurn::Action {
                    description: "MUSIC".to_string(),
                },
                SpeechTurn::Dialogue {
                    speaker: "one".to_string(),
                    text: "two [FADE]".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_noise_lines_skipped() {
        let act = parse_act("\nno colon here\n[ ]\n : missing speaker\nA : \n", 1, 4);
        assert!(act.turns.is_empty());
    }

    #[test]
    fn test_transcript_text_round_trips() {
        let mut original = Act::new("act 1", "ACT 1");
        original.turns.push(SpeechTurn::Dialogue {
            speaker: "Ira Glass".to_string(),
            text: "Welcome back.".to_string(),
        });
        original.turns.push(SpeechTurn::Action {
            description: "MUSIC".to_string(),
        });
        original.turns.push(SpeechTurn::Dialogue {
            speaker: "Zoe Chace".to_string(),
            text: "So here is the thing.".to_string(),
        });

        let reparsed = parse_act(&original.transcript_text(), 1, 4);
        assert_eq!(reparsed.turns, original.turns);
    }
}
