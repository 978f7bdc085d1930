//! Task prompt for one batch of diary entries.

use coach_models::Batch;

use crate::error::Result;

const INSTRUCTIONS: &str = concat!(
    "請根據以上內容進行分析，並提供正向思考建議。其中請特別注意：\n",
    "  1. 分析使用者的情緒與思考模式；\n",
    "  2. 提供實際可行的行動方案來改善負面情緒；\n",
    "  3. 訓練正向思考教練，使其能夠與使用者進行互動。\n",
);

/// Build the task given to a batch's team.
///
/// The prompt states which rows are being processed out of how many, lists
/// the records as a JSON array (column order preserved, empty cells as
/// `null`), and asks for emotion analysis, actionable plans, and coaching.
pub fn build_prompt(batch: &Batch) -> Result<String> {
    let records = serde_json::to_string(&batch.records)?;
    Ok(format!(
        "目前正在處理第 {} 至 {} 筆日記內容（共 {} 筆）。\n以下為該批次日記內容:\n{}\n\n{}",
        batch.start,
        batch.end(),
        batch.total_records,
        records,
        INSTRUCTIONS
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use coach_models::DiaryRecord;

    #[test]
    fn test_prompt_states_range_and_total() {
        let batch = Batch::new(
            1,
            500,
            vec![DiaryRecord::from_row(["entry"], ["x"]); 500],
            1234,
        );

        let prompt = build_prompt(&batch).unwrap();
        assert!(prompt.starts_with("目前正在處理第 500 至 999 筆日記內容（共 1234 筆）。\n"));
    }

    #[test]
    fn test_prompt_embeds_records_as_json() {
        let batch = Batch::new(
            0,
            0,
            vec![
                DiaryRecord::from_row(["date", "entry"], ["2024-05-01", "考試沒考好，很沮喪"]),
                DiaryRecord::from_row(["date", "entry"], ["2024-05-02", ""]),
            ],
            2,
        );

        let prompt = build_prompt(&batch).unwrap();
        assert!(prompt.contains(
            "以下為該批次日記內容:\n[{\"date\":\"2024-05-01\",\"entry\":\"考試沒考好，很沮喪\"},{\"date\":\"2024-05-02\",\"entry\":null}]\n\n"
        ));
    }

    #[test]
    fn test_prompt_ends_with_numbered_instructions() {
        let batch = Batch::new(0, 0, vec![DiaryRecord::from_row(["entry"], ["x"])], 1);
        let prompt = build_prompt(&batch).unwrap();

        assert!(prompt.contains("並提供正向思考建議。其中請特別注意：\n"));
        assert!(prompt.contains("  1. 分析使用者的情緒與思考模式；\n"));
        assert!(prompt.contains("  2. 提供實際可行的行動方案來改善負面情緒；\n"));
        assert!(prompt.ends_with("  3. 訓練正向思考教練，使其能夠與使用者進行互動。\n"));
    }
}
