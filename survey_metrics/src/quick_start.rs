/*!

# Quick start with an online survey form

This example runs the tool end to end using an online form to collect the
answers. It works the same with Google Forms, Microsoft Forms or Qualtrics:
anything that can export the responses as a spreadsheet.

**Collecting the answers** Create a form with the headline questions (the
0-10 recommendation question, the overall satisfaction question) and one
1-5 rating question per category on each axis. Keep the expectation and the
satisfaction variants of a category distinguishable in the question text, for
instance by prefixing them with `Expectations:` and `Satisfaction:`. The
question texts are what the column mapping matches against later.

**Getting the results** After the survey closes, export the responses to a
spreadsheet and download it in the **Excel format** (xlsx). The export has
one row per respondent and one column per question, with the question texts
in the header row.

Run `pulsedash` with the following command (the name of the file may differ
for you):

```bash
pulsedash -i 'engagement survey.xlsx' --excel-worksheet-name 'Responses'
```

The program matches the configured column keywords against the header row,
aggregates the answers and prints the KPI report:

```text
# Employee engagement survey - KPI report
Scope: all departments
Respondents: 42

## KPI overview
- eNPS: 11.9 (promoters 15, passives 17, detractors 10)
...
```

If the defaults do not match your export, write a JSON configuration with
your own column keywords and categories and pass it with `--config`. Use
`--inspect` first to see the worksheets, the header row and which fields
matched which columns.

**Exporting the summary** The `--out` flag writes the full summary (overall
KPIs, category table, department breakdown) in JSON format, for dashboards
or for regression checks together with the `--reference` flag.

*/
