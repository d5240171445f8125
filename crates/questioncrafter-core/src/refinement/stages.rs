//! The eleven refinement stages and their prompts.

use std::fmt;

/// One step of the refinement dialogue. Stages run in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Brainstorm,
    Critique,
    Revision,
    Expansion,
    IndividualAnswers,
    Synthesis,
    ImprovedQuestion,
    Summary,
    Rationale,
    HarmonyPrinciple,
    NewDimensions,
}

impl Stage {
    pub const ALL: [Stage; 11] = [
        Stage::Brainstorm,
        Stage::Critique,
        Stage::Revision,
        Stage::Expansion,
        Stage::IndividualAnswers,
        Stage::Synthesis,
        Stage::ImprovedQuestion,
        Stage::Summary,
        Stage::Rationale,
        Stage::HarmonyPrinciple,
        Stage::NewDimensions,
    ];

    /// 1-based position in the dialogue.
    pub fn number(self) -> u8 {
        match self {
            Stage::Brainstorm => 1,
            Stage::Critique => 2,
            Stage::Revision => 3,
            Stage::Expansion => 4,
            Stage::IndividualAnswers => 5,
            Stage::Synthesis => 6,
            Stage::ImprovedQuestion => 7,
            Stage::Summary => 8,
            Stage::Rationale => 9,
            Stage::HarmonyPrinciple => 10,
            Stage::NewDimensions => 11,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Brainstorm => "brainstorm",
            Stage::Critique => "critique",
            Stage::Revision => "revision",
            Stage::Expansion => "expansion",
            Stage::IndividualAnswers => "individual_answers",
            Stage::Synthesis => "synthesis",
            Stage::ImprovedQuestion => "improved_question",
            Stage::Summary => "summary",
            Stage::Rationale => "rationale",
            Stage::HarmonyPrinciple => "harmony_principle",
            Stage::NewDimensions => "new_dimensions",
        }
    }

    /// Prompt text for this stage. Only the first stage uses the persona
    /// profiles; stages 5 and 7 restate the question.
    pub fn prompt(self, question: &str, persona_info: &str) -> String {
        match self {
            Stage::Brainstorm => format!(
                "You are a QuestionCrafter reasoning agent. Three expert personas will reason \
                 together, step by step, to arrive at a better version of a question a user \
                 has asked.\n\n\
                 First, let each persona share initial insights on the question below. Draw \
                 on the specific knowledge, experience and ideas of your field, and look for \
                 angles and dimensions others might miss. Later prompts will weave these \
                 perspectives together, show where they support or challenge one another, and \
                 build a deeper question to return to the user.\n\n\
                 The personas are:\n{persona_info}\n\n\
                 The question is: {question}\n\n\
                 Write each persona's initial response on its own line."
            ),
            Stage::Critique => "Now take a critical stance. As each expert, examine your own \
                 first analysis and those of your peers. Do not only criticise: enrich and \
                 extend the ideas. Name hidden assumptions, possible biases and the places \
                 where more exploration would pay off."
                .to_string(),
            Stage::Revision => "Reflect on the critiques you received and adjust your views. \
                 Reassess and reformulate your ideas into a more nuanced and connected picture \
                 of the question.\n\n\
                 Favour claims that are well supported, constructive and hold up under \
                 scrutiny."
                .to_string(),
            Stage::Expansion => "Build a network of thought from the critiques and the \
                 alternative perspectives. Show how new ideas connect to and strengthen the \
                 existing ones, and where novel concepts could become new nodes.\n\n\
                 Each persona should push past conventional thinking and explore divergent \
                 ideas prompted by the discussion so far. Judge how each idea adds insight or \
                 opens a deeper dimension of the question, and feel free to branch into new \
                 lines of reasoning."
                .to_string(),
            Stage::IndividualAnswers => format!(
                "It is time for each expert to settle on a final answer. Reflect on the whole \
                 dialogue and on how your thinking changed, then condense it into one answer \
                 that would genuinely help the person who asked.\n\n\
                 For each expert, give a short summary of their best answer. Each summary \
                 should:\n\
                 1. Be at most 3-4 sentences. If the question asks for advice, make the \
                 answer specific and actionable.\n\
                 2. Aim for truth, helpfulness and practicality.\n\
                 3. Bring out the most useful or profound insight you contributed.\n\
                 4. Avoid repeating what other experts already covered.\n\n\
                 Speaking as each expert, what is your best answer to the original question: \
                 {question}?\n\n\
                 Start each answer with the persona's name and title followed by a colon."
            ),
            Stage::Synthesis => "Combine the experts' individual answers into one complete \
                 answer to the original question that keeps the best of each.\n\n\
                 Do not frame the answer in terms of any single persona's field or agenda. \
                 Phrase it so it reaches for deeper truths that hold whichever experts took \
                 part, goes beyond any one viewpoint, and opens useful new paths of reasoning \
                 for the person who asked."
                .to_string(),
            Stage::ImprovedQuestion => format!(
                "Drawing on everything discussed, rewrite the original question into a \
                 clearly better one.\n\n\
                 The new question should be deeper and clearer, spark more curiosity and \
                 invite fuller exploration, while staying easy to read. Consider:\n\n\
                 1. Scope: clear dimensions of inquiry with a single focus.\n\
                 2. Precision: terms specific enough to guide thinking yet open to \
                 interpretation, with no redundant qualifiers.\n\
                 3. Levels: room for both practical and theoretical answers, short-term and \
                 long-term reflection.\n\
                 4. Dialogue: natural follow-ups without listing them, inviting personal \
                 experience as well as broader analysis.\n\
                 5. Balance: complexity only where it serves the question.\n\n\
                 As a reminder, the original question was: {question}\n\n\
                 Reply with the improved question only."
            ),
            Stage::Summary => "Summarise how this conversation evolved in a single \
                 paragraph. Cover each expert's key contributions, how their perspectives were \
                 combined and refined, the main turning points, and how the final question \
                 emerged. Keep it clear and concise."
                .to_string(),
            Stage::Rationale => "Explain the rationale for this refinement.\n\n\
                 In one or two concise bullet points, say how the refined question improves \
                 on the original in quality, depth and effectiveness, and name the main \
                 limitation of the original question.\n\n\
                 Then list the main dimensions of the new question and why each matters.\n\n\
                 Format the answer as markdown."
                .to_string(),
            Stage::HarmonyPrinciple => "Identify one deep principle that every persona can \
                 agree on. In 2-3 sentences, explain what this shared foundation is and how it \
                 shaped the collective reasoning. Aim for something fundamental yet simple."
                .to_string(),
            Stage::NewDimensions => "From the combined perspective, help the person who \
                 asked explore new and related dimensions of the improved question.\n\n\
                 Exploration pathways: suggest directions, sub-questions or meta-questions \
                 worth pursuing next.\n\n\
                 Further reading: point to relevant literature, articles, people or studies \
                 that give more context.\n\n\
                 Do not use markdown in your answer."
                .to_string(),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_follow_declaration_order() {
        for (idx, stage) in Stage::ALL.iter().enumerate() {
            assert_eq!(stage.number() as usize, idx + 1);
        }
    }

    #[test]
    fn only_first_stage_lists_personas() {
        let info = "Name: Ada";
        assert!(Stage::Brainstorm.prompt("Q?", info).contains(info));
        for stage in &Stage::ALL[1..] {
            assert!(!stage.prompt("Q?", info).contains(info), "{stage}");
        }
    }

    #[test]
    fn question_is_restated_where_needed() {
        let question = "How should I plan my career?";
        for stage in Stage::ALL {
            let restates = stage.prompt(question, "").contains(question);
            let expected = matches!(
                stage,
                Stage::Brainstorm | Stage::IndividualAnswers | Stage::ImprovedQuestion
            );
            assert_eq!(restates, expected, "{stage}");
        }
    }
}
