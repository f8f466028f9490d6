use walkgain_core::{MotionSample, TrialRecord};

/// A record that serializes to exactly one CSV line.
pub trait CsvRow {
    const HEADER: &'static str;

    fn fields(&self) -> Vec<String>;

    fn to_line(&self) -> String {
        let mut line = self.fields().join(",");
        line.push('\n');
        line
    }
}

/// Absent values keep the historical `-1` marker in the files.
fn optional(value: Option<f32>) -> String {
    value.map_or_else(|| "-1".to_string(), |v| v.to_string())
}

fn flag(value: bool) -> String {
    let text = if value { "True" } else { "False" };
    text.to_string()
}

fn escape(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn training_tag(training: bool) -> String {
    let text = if training { "1" } else { "0" };
    text.to_string()
}

impl CsvRow for TrialRecord {
    const HEADER: &'static str = "PID,TrainingTrial,TrialNumber,Acceleration,GainValueReported,TimeWhenReported,Detection,TotalTime,Forward,MaxGainValue,TimeWhenStartedWalking";

    fn fields(&self) -> Vec<String> {
        vec![
            escape(&self.participant),
            training_tag(self.training),
            self.trial_number.to_string(),
            self.acceleration.to_string(),
            optional(self.reported_gain),
            optional(self.reported_time),
            flag(self.detected()),
            self.total_time.to_string(),
            flag(self.direction.is_forward()),
            self.peak_gain.to_string(),
            optional(self.walk_start_time),
        ]
    }
}

impl CsvRow for MotionSample {
    const HEADER: &'static str = "PID,TrainingTrial,TrialNumber,CurrentGain,TimeSinceStart,RealX,VirtualX,Y,RealZ,VirtualZ,HeadForwardX,HeadForwardY,HeadForwardZ";

    fn fields(&self) -> Vec<String> {
        vec![
            escape(&self.participant),
            training_tag(self.training),
            self.trial_number.to_string(),
            self.gain.to_string(),
            self.elapsed.to_string(),
            self.real.x.to_string(),
            self.virtual_pos.x.to_string(),
            self.real.y.to_string(),
            self.real.z.to_string(),
            self.virtual_pos.z.to_string(),
            self.head_forward.x.to_string(),
            self.head_forward.y.to_string(),
            self.head_forward.z.to_string(),
        ]
    }
}
