/*!

This is the long-form manual for `outbreak_events` and `outbreakdash`.

## Input format

The input is a CSV file with a header row. Three columns are used:

| column       | content                                                  |
|--------------|----------------------------------------------------------|
| `Date_Event` | the date of the report                                   |
| `Category`   | the setting of the event (`Poultry`, `Dairy`, `Human`...) |
| `Event`      | the free-text description of the event                   |

Other columns are shown in the preview and otherwise ignored. The names of the three
columns can be changed in the configuration file.

Dates that cannot be read are not an error: the row is kept for the preview and
the timeline, and left out of the map.

## Event descriptions

Two kinds of information are read from the description:

* the total count: the first number followed by ` positive`, for example `12 positive herds`.
  It is 0 when there is none.
* the region mentions: a known region name followed by a count in parentheses, for
  example `Michigan (4)`. All the mentions are kept, in the order of the text.

Counts are written with the digits `0` to `9`. A count larger than 18446744073709551615
(the largest `u64`) is ignored with a warning: the mention is dropped, and for the total
the next `... positive` that fits is used.

Region names are case-sensitive. A name that is not in the region table is ignored.
A name is also recognized inside a longer word: `WestTexas (4)` counts for Texas, while
`Arkansas (3)` does not count for Kansas because of the lowercase `k`.

The default table contains:

| name          | code |
|---------------|------|
| Michigan      | MI   |
| Texas         | TX   |
| South Dakota  | SD   |
| Massachusetts | MA   |
| Kansas        | KS   |
| Minnesota     | MN   |
| Colorado      | CO   |

## Repeated mentions

When one description mentions the same region more than once, the
`duplicateRegionPolicy` option decides what happens:

* `keepAll` (default): every mention is a point of the time series
* `lastWins`: only the last count is kept
* `firstWins`: only the first count is kept
* `sum`: the counts are added

## Configuration file

```json
{
  "source": {
    "filePath": "H5N1_US_2024.csv",
    "dateColumn": "Date_Event",
    "categoryColumn": "Category",
    "eventColumn": "Event",
    "dateFormats": ["%Y-%m-%d", "%m/%d/%Y"]
  },
  "regions": [
    { "name": "Michigan", "code": "MI" },
    { "name": "Idaho", "code": "ID" }
  ],
  "rules": { "duplicateRegionPolicy": "keepAll" },
  "outputSettings": { "category": "Poultry", "previewRows": 5, "outputPath": "stdout" }
}
```

Only `source.filePath` is mandatory. It is relative to the directory of the configuration file.
When `regions` is provided, it replaces the default table.

## Output

The summary is a JSON document with one frame per date, in increasing order. Each
frame lists the region codes and counts reported on that date. When there is nothing
to display, `noData` is `true`, the frames are empty and `colorRange` is `null`.

*/
