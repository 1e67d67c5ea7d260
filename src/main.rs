use tally::error::AppResult;

fn main() -> AppResult<()> {
    tally::entry::run()
}
