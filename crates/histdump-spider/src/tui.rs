use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

/// Total, success & failure bars for one run; every bar is hidden outside of tui mode.
pub(crate) struct RunProgress {
    _multi: Option<MultiProgress>,
    total: ProgressBar,
    success: ProgressBar,
    fails: ProgressBar,
}

impl RunProgress {
    pub(crate) fn hidden() -> Self {
        Self {
            _multi: None,
            total: ProgressBar::hidden(),
            success: ProgressBar::hidden(),
            fails: ProgressBar::hidden(),
        }
    }

    pub(crate) fn new(len: usize, tui: bool) -> anyhow::Result<Self> {
        if !tui {
            return Ok(Self::hidden());
        }

        // overall multi progress bar
        let multi = MultiProgress::new();

        // total number of tickers to collect
        let total = multi.add(
            ProgressBar::new(len as u64).with_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.cyan} histdump\n \
                            {msg:>8.white} [{bar:40.white/grey}] {pos}/{len} tickers \
                            ({percent}%) {elapsed_precise} eta {eta}",
                    )?
                    .progress_chars("=> "),
            ),
        );
        total.set_message("total");
        total.enable_steady_tick(Duration::from_millis(100));

        // total successful collections
        let success = multi.insert_after(
            &total,
            ProgressBar::new(len as u64).with_style(
                ProgressStyle::default_bar()
                    .template(" {msg:>8.green} [{bar:40.green}] {pos}")?
                    .progress_chars("=> "),
            ),
        );
        success.set_message("scraped");

        // total failed collections
        let fails = multi.insert_after(
            &success,
            ProgressBar::new(len as u64).with_style(
                ProgressStyle::default_bar()
                    .template(" {msg:>8.red} [{bar:40.red}] {pos}")?
                    .progress_chars("=> "),
            ),
        );
        fails.set_message("failed");

        Ok(Self {
            _multi: Some(multi),
            total,
            success,
            fails,
        })
    }

    pub(crate) fn record(&self, ok: bool) {
        self.total.inc(1);
        match ok {
            true => self.success.inc(1),
            false => self.fails.inc(1),
        }
    }

    pub(crate) fn finish(&self) {
        self.total.finish();
        self.success.finish();
        self.fails.finish();
    }
}
